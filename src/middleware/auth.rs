use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::{error::AppError, models::UserId};

/// Header in which the gateway passes the authenticated user's id
pub const USER_ID_HEADER: &str = "x-user-id";

/// The user a request acts for
///
/// Credentials are checked upstream; this only reads the resolved id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser(pub UserId);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.trim().parse::<i64>().ok())
            .filter(|id| *id > 0)
            .map(|id| AuthUser(UserId(id)))
            .ok_or_else(|| {
                AppError::Unauthorized("Authentication credentials were not provided.".to_string())
            })
    }
}
