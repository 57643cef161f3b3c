use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use toktik_core::constants::USERNAME_HEADER;
use toktik_core::AppError;

use crate::error::HttpAppError;

/// Username injected by the upstream proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub username: String,
}

impl<S> FromRequestParts<S> for UserIdentity
where
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let username = parts
            .headers
            .get(USERNAME_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                HttpAppError(AppError::BadRequest(format!(
                    "Missing {} header",
                    USERNAME_HEADER
                )))
            })?;

        Ok(UserIdentity {
            username: username.to_string(),
        })
    }
}
