//! Bearer-token helpers for integration tests.

use ::http::header::AUTHORIZATION;
use ::http::{HeaderName, HeaderValue};

use amora_auth_types::token::issue_token;

/// Shared secret used by service tests.
pub const TEST_JWT_SECRET: &str = "test-jwt-secret-for-unit-tests-only";

/// Identity to authenticate test requests as.
pub struct MockAuth {
    pub user_id: i64,
    pub secret: String,
}

impl MockAuth {
    pub fn new(user_id: i64) -> Self {
        Self {
            user_id,
            secret: TEST_JWT_SECRET.to_owned(),
        }
    }

    pub fn token(&self) -> String {
        issue_token(self.user_id, &self.secret, 60).expect("sign test token")
    }

    /// `Authorization: Bearer <token>` header pair.
    pub fn header(&self) -> (HeaderName, HeaderValue) {
        let value = HeaderValue::from_str(&format!("Bearer {}", self.token()))
            .expect("bearer header value");
        (AUTHORIZATION, value)
    }
}
