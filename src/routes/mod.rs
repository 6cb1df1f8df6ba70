use axum::{
    http::{header, Method, StatusCode},
    middleware,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    db::{Cache, CatalogStore, SwipeStore},
    error::{AppError, AppResult},
    middleware::{make_span_with_request_id, request_id_middleware},
    models::Paging,
};

pub mod extract;
pub mod recommendations;
pub mod swipes;
pub mod variants;

/// Shared handles every handler works against
pub struct AppState {
    pub catalog: Arc<dyn CatalogStore>,
    pub swipes: Arc<dyn SwipeStore>,
    pub cache: Option<Cache>,
    pub cache_ttl: u64,
    pub swipe_limit: usize,
}

impl AppState {
    /// State backed by a single store implementing both catalog and swipes
    pub fn with_store<S>(store: Arc<S>, cache: Option<Cache>, cache_ttl: u64, swipe_limit: usize) -> Self
    where
        S: CatalogStore + SwipeStore + 'static,
    {
        Self {
            catalog: store.clone(),
            swipes: store,
            cache,
            cache_ttl,
            swipe_limit,
        }
    }
}

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::PUT, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route("/", get(ping))
        .route("/index", get(ping))
        .route("/health", get(health_check))
        .nest("/api", api_routes())
        .method_not_allowed_fallback(method_not_allowed)
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(cors),
        )
        .with_state(state)
}

/// API routes under /api
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/variant", get(variants::list).post(variants::create))
        .route("/variant/recommendation", get(recommendations::explicit))
        .route(
            "/variant/swinger",
            get(swipes::recommend).post(swipes::swipe),
        )
        .route("/variant/:id", get(variants::get))
}

async fn ping() -> Json<Value> {
    Json(json!({ "ping": "pong" }))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

async fn not_found() -> AppError {
    AppError::NotFound("Resource not found".to_string())
}

async fn method_not_allowed(method: Method) -> AppError {
    AppError::MethodNotAllowed(format!("{} is not supported on this resource", method))
}

/// Takes `page` and `page_size` out of raw query parameters
///
/// Both must be non-negative integers when present.
pub(crate) fn take_paging(params: &mut HashMap<String, String>) -> AppResult<Paging> {
    Ok(Paging {
        page: take_non_negative(params, "page")?,
        page_size: take_non_negative(params, "page_size")?,
    })
}

fn take_non_negative(params: &mut HashMap<String, String>, name: &str) -> AppResult<Option<u32>> {
    let Some(raw) = params.remove(name) else {
        return Ok(None);
    };

    let value: i64 = raw.trim().parse().map_err(|_| {
        AppError::InvalidInput(format!("{}: Parameter should be an integer", name))
    })?;
    if value < 0 {
        return Err(AppError::InvalidInput(format!(
            "{}: Negative numbers are not allowed",
            name
        )));
    }

    u32::try_from(value)
        .map(Some)
        .map_err(|_| AppError::InvalidInput(format!("{}: Parameter is too large", name)))
}
