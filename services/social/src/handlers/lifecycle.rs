use axum::{Json, body::Bytes, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use amora_auth_types::identity::Identity;
use amora_domain::lifecycle::LifecycleEventType;

use crate::error::SocialServiceError;
use crate::state::AppState;
use crate::usecase::lifecycle::{ChangeLifecycleUseCase, GetUserStatusUseCase};

#[derive(Deserialize)]
pub struct LifecycleRequest {
    pub reason: Option<String>,
}

impl LifecycleRequest {
    /// The body is optional whatever the `Content-Type`; blank means no reason.
    fn parse_reason(body: &[u8]) -> Result<Option<String>, SocialServiceError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        let request: Self =
            serde_json::from_slice(body).map_err(|_| SocialServiceError::InvalidBody)?;
        Ok(request.reason)
    }
}

#[derive(Serialize)]
pub struct LifecycleResponse {
    pub event_id: Uuid,
    pub event_type: LifecycleEventType,
}

async fn change(
    identity: Identity,
    state: AppState,
    event_type: LifecycleEventType,
    body: Bytes,
) -> Result<(StatusCode, Json<LifecycleResponse>), SocialServiceError> {
    let reason = LifecycleRequest::parse_reason(&body)?;
    let usecase = ChangeLifecycleUseCase {
        users: state.user_repo(),
    };
    let intent = usecase
        .execute(identity.user_id, event_type, reason.as_deref())
        .await?;
    state.outbox_signal.notify();
    Ok((
        StatusCode::ACCEPTED,
        Json(LifecycleResponse {
            event_id: intent.event_id,
            event_type,
        }),
    ))
}

// ── GET /user/status ─────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct UserStatusResponse {
    pub status: &'static str,
}

pub async fn get_user_status(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<UserStatusResponse>, SocialServiceError> {
    let usecase = GetUserStatusUseCase {
        users: state.user_repo(),
    };
    let user = usecase.execute(identity.user_id).await?;
    let status = if user.is_active {
        "activated"
    } else {
        "deactivated"
    };
    Ok(Json(UserStatusResponse { status }))
}

// ── POST /user/deactivate ────────────────────────────────────────────────────

pub async fn deactivate_user(
    identity: Identity,
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<LifecycleResponse>), SocialServiceError> {
    change(identity, state, LifecycleEventType::Deactivated, body).await
}

// ── POST /user/reactivate ────────────────────────────────────────────────────

pub async fn reactivate_user(
    identity: Identity,
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<LifecycleResponse>), SocialServiceError> {
    change(identity, state, LifecycleEventType::Reactivated, body).await
}

// ── DELETE /user ─────────────────────────────────────────────────────────────

pub async fn delete_user(
    identity: Identity,
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<LifecycleResponse>), SocialServiceError> {
    change(identity, state, LifecycleEventType::Deleted, body).await
}
