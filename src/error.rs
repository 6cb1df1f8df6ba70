use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::models::AttributeError;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    #[error("Attribute error: {0}")]
    Attribute(#[from] AttributeError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Numeric code carried in the error envelope
    pub fn error_code(&self) -> u16 {
        match self {
            AppError::MethodNotAllowed(_) => 103,
            AppError::NotFound(_) => 104,
            AppError::Unauthorized(_) => 105,
            AppError::InvalidInput(_) => 106,
            AppError::Attribute(_) => 107,
            AppError::Database(_) | AppError::Cache(_) | AppError::Internal(_) => 999,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.error_code();
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Attribute(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::MethodNotAllowed(msg) => (StatusCode::METHOD_NOT_ALLOWED, msg),
            AppError::Database(_) | AppError::Cache(_) | AppError::Internal(_) => {
                tracing::error!(error = %self, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
        };

        let body = Json(json!({
            "success": 0,
            "error": {
                "message": message,
                "error_code": code,
            }
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_error_is_bad_request() {
        let error: AppError = AttributeError::UnknownAttribute("colour".to_string()).into();
        assert_eq!(error.error_code(), 107);
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_not_found_status() {
        let response = AppError::NotFound("Variant 3".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_method_not_allowed_status() {
        let error = AppError::MethodNotAllowed("DELETE".to_string());
        assert_eq!(error.error_code(), 103);
        assert_eq!(error.into_response().status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test]
    fn test_internal_errors_share_code() {
        assert_eq!(AppError::Internal("boom".to_string()).error_code(), 999);
        assert_eq!(AppError::Database(sqlx::Error::RowNotFound).error_code(), 999);
    }
}
