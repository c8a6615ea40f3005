use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::errors::AppError;

/// Header carrying the caller's user id, set by the upstream credential layer
/// after it has validated the session token.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated caller. Missing or malformed identity → 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::Unauthorized)?;

        Uuid::parse_str(raw.trim())
            .map(CurrentUser)
            .map_err(|_| AppError::Unauthorized)
    }
}
