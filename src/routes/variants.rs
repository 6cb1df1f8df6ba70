use axum::{extract::State, http::StatusCode, Extension, Json};
use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{NewVariant, Variant},
    routes::{
        extract::{AppJson, AppPath, AppQuery},
        take_paging, AppState,
    },
};

/// Lists the catalog, optionally paged
pub async fn list(
    State(state): State<Arc<AppState>>,
    AppQuery(mut params): AppQuery<HashMap<String, String>>,
) -> AppResult<Json<Vec<Variant>>> {
    let paging = take_paging(&mut params)?;
    let variants = state.catalog.list_variants(paging).await?;
    Ok(Json(variants))
}

/// Adds a variant after checking every scraped attribute parses
pub async fn create(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    AppJson(new_variant): AppJson<NewVariant>,
) -> AppResult<(StatusCode, Json<Variant>)> {
    if let Err(e) = new_variant.validate() {
        tracing::warn!(
            request_id = %request_id,
            name = %new_variant.name,
            error = %e,
            "Rejected variant"
        );
        return Err(e);
    }

    let variant = state.catalog.insert_variant(new_variant).await?;
    tracing::info!(
        request_id = %request_id,
        variant_id = variant.id,
        "Variant created"
    );

    Ok((StatusCode::CREATED, Json(variant)))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<Variant>> {
    state
        .catalog
        .get_variant(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Variant {} not found", id)))
}
