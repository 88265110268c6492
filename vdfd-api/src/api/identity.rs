//! Caller identity
//!
//! Authentication happens upstream; this service only receives the opaque
//! user id it should act for.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::ApiError;

/// Header carrying the authenticated user's id
pub const USER_ID_HEADER: &str = "x-user-id";

/// Authenticated user id, taken from the `X-User-Id` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserId(pub String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for UserId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| ApiError::Unauthorized("missing X-User-Id header".to_string()))?;

        let user = value
            .to_str()
            .map_err(|_| ApiError::Unauthorized("X-User-Id is not valid text".to_string()))?
            .trim();

        if user.is_empty() {
            return Err(ApiError::Unauthorized("X-User-Id is empty".to_string()));
        }
        Ok(UserId(user.to_string()))
    }
}
