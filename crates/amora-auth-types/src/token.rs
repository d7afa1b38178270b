//! HS256 bearer tokens.
//!
//! End-user tokens are issued by the login service and only validated here. The
//! outbox worker also issues short-lived tokens so it can call the conversation
//! service on behalf of the user who accepted a friend request.

use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// Lifetime of tokens minted for service-to-service calls, in seconds.
pub const SERVICE_TOKEN_TTL_SECS: u64 = 300;

/// Identity extracted from a validated token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenInfo {
    pub user_id: i64,
    pub exp: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("malformed token")]
    Malformed,
    #[error("token encoding failed")]
    Encode(#[source] jsonwebtoken::errors::Error),
}

/// JWT claims payload.
///
/// | Claim | Type | Meaning |
/// |-------|------|---------|
/// | `user_id` | integer | account id |
/// | `exp` | seconds since epoch | expiration |
#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub user_id: i64,
    pub exp: u64,
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Sign a token for `user_id` that expires `ttl_secs` from now.
pub fn issue_token(user_id: i64, secret: &str, ttl_secs: u64) -> Result<String, AuthError> {
    let claims = JwtClaims {
        user_id,
        exp: now_secs() + ttl_secs,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(AuthError::Encode)
}

/// Validate a bearer token and return the caller's identity.
///
/// HS256 only; `exp` is required and checked with the library's default leeway.
pub fn validate_access_token(token: &str, secret: &str) -> Result<TokenInfo, AuthError> {
    let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.validate_exp = true;
    validation.set_required_spec_claims(&["exp"]);

    let data = decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        _ => AuthError::Malformed,
    })?;

    Ok(TokenInfo {
        user_id: data.claims.user_id,
        exp: data.claims.exp,
    })
}
