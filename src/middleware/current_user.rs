use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;

/// Header the authentication provider sets to the authenticated user's id
pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated user making the request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser(pub i64);

#[axum::async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| AppError::Unauthorized("Missing user identity".to_string()))?;

        header
            .to_str()
            .ok()
            .and_then(|s| s.trim().parse::<i64>().ok())
            .map(CurrentUser)
            .ok_or_else(|| {
                AppError::Unauthorized("Unknown user check that the auth token is correct.".to_string())
            })
    }
}
