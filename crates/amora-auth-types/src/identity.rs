//! Bearer-token identity extractor.

use axum::extract::FromRequestParts;
use http::StatusCode;
use http::header::AUTHORIZATION;
use http::request::Parts;

use crate::token::validate_access_token;

/// Supplies the HMAC secret used to validate bearer tokens.
/// Implemented by each service's router state.
pub trait JwtSecretProvider {
    fn jwt_secret(&self) -> &str;
}

/// Authenticated caller, taken from `Authorization: Bearer <jwt>`.
///
/// Rejects with 401 when the header is absent, not a bearer token, or fails validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i64,
}

impl<S> FromRequestParts<S> for Identity
where
    S: JwtSecretProvider + Send + Sync,
{
    type Rejection = StatusCode;

    // Validation is synchronous; resolve it before building the 'static future.
    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let result = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or(StatusCode::UNAUTHORIZED)
            .and_then(|token| {
                validate_access_token(token.trim(), state.jwt_secret())
                    .map_err(|_| StatusCode::UNAUTHORIZED)
            })
            .map(|info| Self {
                user_id: info.user_id,
            });

        async move { result }
    }
}
