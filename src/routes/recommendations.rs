use axum::{extract::State, Extension, Json};
use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::{PreferenceVector, RankedVariant},
    routes::{extract::AppQuery, take_paging, AppState},
    services::recommendations,
};

/// Ranks the catalog against `?<attribute>=<value>` preferences
pub async fn explicit(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    AppQuery(mut params): AppQuery<HashMap<String, String>>,
) -> AppResult<Json<Vec<RankedVariant>>> {
    let paging = take_paging(&mut params)?;
    let preferences = PreferenceVector::from_raw(&params)?;

    tracing::info!(
        request_id = %request_id,
        preferences = %preferences.canonical(),
        "Explicit recommendation requested"
    );

    let ranked = recommendations::recommend_for_preferences(
        state.catalog.as_ref(),
        state.cache.as_ref(),
        state.cache_ttl,
        preferences,
        paging,
    )
    .await?;

    Ok(Json(ranked))
}
