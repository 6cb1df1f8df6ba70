use axum::{extract::State, http::StatusCode, Extension, Json};
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::{CurrentUser, RequestId},
    models::{RankedVariant, Swipe, SwipeRequest},
    routes::{extract::AppJson, AppState},
    services::recommendations,
};

/// Next variants to show the current user
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    CurrentUser(user_id): CurrentUser,
) -> AppResult<Json<Vec<RankedVariant>>> {
    tracing::info!(request_id = %request_id, user_id, "Swipe recommendation requested");

    let ranked = recommendations::recommend_for_user(
        state.catalog.as_ref(),
        state.swipes.as_ref(),
        user_id,
        state.swipe_limit,
    )
    .await?;

    Ok(Json(ranked))
}

/// Records the current user's like or dislike
pub async fn swipe(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    CurrentUser(user_id): CurrentUser,
    AppJson(request): AppJson<SwipeRequest>,
) -> AppResult<(StatusCode, Json<Swipe>)> {
    tracing::info!(
        request_id = %request_id,
        user_id,
        variant_id = request.variant_id,
        "Swipe received"
    );

    let swipe = recommendations::record_swipe(
        state.catalog.as_ref(),
        state.swipes.as_ref(),
        user_id,
        request,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(swipe)))
}
