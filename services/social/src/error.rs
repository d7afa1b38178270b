use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Social service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum SocialServiceError {
    /// Unknown user, or the account is not in the state the operation requires.
    #[error("user not found")]
    UserNotFound,
    /// Unknown request, not addressed to the caller, or no longer pending.
    #[error("friend request not found")]
    FriendRequestNotFound,
    #[error("profile not found")]
    ProfileNotFound,
    #[error("friend request already exists")]
    FriendRequestExists,
    #[error("cannot send a friend request to yourself")]
    CannotRequestSelf,
    #[error("invalid request body")]
    InvalidBody,
    #[error("upstream service error")]
    Upstream(#[source] anyhow::Error),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl SocialServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::FriendRequestNotFound => "FRIEND_REQUEST_NOT_FOUND",
            Self::ProfileNotFound => "PROFILE_NOT_FOUND",
            Self::FriendRequestExists => "FRIEND_REQUEST_EXISTS",
            Self::CannotRequestSelf => "CANNOT_REQUEST_SELF",
            Self::InvalidBody => "INVALID_BODY",
            Self::Upstream(_) => "UPSTREAM",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for SocialServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::UserNotFound | Self::FriendRequestNotFound | Self::ProfileNotFound => {
                StatusCode::NOT_FOUND
            }
            Self::FriendRequestExists => StatusCode::CONFLICT,
            Self::CannotRequestSelf | Self::InvalidBody => StatusCode::BAD_REQUEST,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        match &self {
            Self::Internal(e) => tracing::error!(error = %e, kind = "INTERNAL", "internal error"),
            Self::Upstream(e) => tracing::warn!(error = %e, kind = "UPSTREAM", "upstream error"),
            _ => {}
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}

/// Failure talking to a downstream collaborator. The outbox row stays pending.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("request failed")]
    Transport(#[source] reqwest::Error),
    #[error("timed out")]
    Timeout,
    #[error("unexpected status {0}")]
    UnexpectedStatus(u16),
    #[error("invalid response body: {0}")]
    Decode(String),
    #[error("could not encode message")]
    Encode(#[from] serde_json::Error),
    #[error("broker error")]
    Broker(#[from] lapin::Error),
    #[error("broker rejected the message")]
    Rejected,
    #[error("could not sign service token")]
    Token(#[from] amora_auth_types::token::AuthError),
}

impl From<reqwest::Error> for DeliveryError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Transport(e)
        }
    }
}

impl From<DeliveryError> for SocialServiceError {
    fn from(e: DeliveryError) -> Self {
        Self::Upstream(e.into())
    }
}
