use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use amora_auth_types::identity::Identity;
use amora_domain::friend_request::FriendRequestStatus;

use crate::domain::types::FriendRequest;
use crate::error::SocialServiceError;
use crate::state::AppState;
use crate::usecase::friend_request::{
    AcceptFriendRequestUseCase, CheckRequestStatusUseCase, ListFriendRequestsUseCase,
    RejectFriendRequestUseCase, RequestDirection, SendFriendRequestUseCase,
};

#[derive(Serialize)]
pub struct FriendRequestResponse {
    pub id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub status: FriendRequestStatus,
    pub conversation_id: Option<Uuid>,
    #[serde(serialize_with = "amora_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "amora_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<FriendRequest> for FriendRequestResponse {
    fn from(r: FriendRequest) -> Self {
        Self {
            id: r.id,
            sender_id: r.sender_id,
            receiver_id: r.receiver_id,
            status: r.status,
            conversation_id: r.conversation_id,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

// ── POST /friend-requests ────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SendFriendRequestBody {
    pub receiver_id: i64,
}

pub async fn send_friend_request(
    identity: Identity,
    State(state): State<AppState>,
    Json(body): Json<SendFriendRequestBody>,
) -> Result<(StatusCode, Json<FriendRequestResponse>), SocialServiceError> {
    let usecase = SendFriendRequestUseCase {
        users: state.user_repo(),
        requests: state.friend_request_repo(),
    };
    let created = usecase
        .execute(identity.user_id, body.receiver_id)
        .await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

// ── GET /friend-requests/received, /friend-requests/sent ─────────────────────

pub async fn list_received(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<Vec<FriendRequestResponse>>, SocialServiceError> {
    list(identity, state, RequestDirection::Received).await
}

pub async fn list_sent(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<Vec<FriendRequestResponse>>, SocialServiceError> {
    list(identity, state, RequestDirection::Sent).await
}

async fn list(
    identity: Identity,
    state: AppState,
    direction: RequestDirection,
) -> Result<Json<Vec<FriendRequestResponse>>, SocialServiceError> {
    let usecase = ListFriendRequestsUseCase {
        requests: state.friend_request_repo(),
    };
    let requests = usecase.execute(identity.user_id, direction).await?;
    Ok(Json(requests.into_iter().map(Into::into).collect()))
}

// ── GET /checkReqStatus/{receiver_id} ───────────────────────────────────────

#[derive(Serialize)]
pub struct RequestStatusResponse {
    /// Whether the caller has already sent `receiver_id` a request.
    #[serde(rename = "requestStatus")]
    pub request_status: bool,
    pub status: Option<FriendRequestStatus>,
}

pub async fn check_request_status(
    identity: Identity,
    State(state): State<AppState>,
    Path(receiver_id): Path<i64>,
) -> Result<Json<RequestStatusResponse>, SocialServiceError> {
    let usecase = CheckRequestStatusUseCase {
        requests: state.friend_request_repo(),
    };
    let request = usecase.execute(identity.user_id, receiver_id).await?;
    Ok(Json(RequestStatusResponse {
        request_status: request.is_some(),
        status: request.map(|r| r.status),
    }))
}

// ── POST /friend-requests/{id}/accept ────────────────────────────────────────

#[derive(Serialize)]
pub struct AcceptResponse {
    pub id: i64,
    pub status: FriendRequestStatus,
}

pub async fn accept_friend_request(
    identity: Identity,
    State(state): State<AppState>,
    Path(request_id): Path<i64>,
) -> Result<Json<AcceptResponse>, SocialServiceError> {
    let usecase = AcceptFriendRequestUseCase {
        requests: state.friend_request_repo(),
    };
    usecase.execute(request_id, identity.user_id).await?;
    state.outbox_signal.notify();
    Ok(Json(AcceptResponse {
        id: request_id,
        status: FriendRequestStatus::Accepted,
    }))
}

// ── POST /friend-requests/{id}/reject ────────────────────────────────────────

pub async fn reject_friend_request(
    identity: Identity,
    State(state): State<AppState>,
    Path(request_id): Path<i64>,
) -> Result<StatusCode, SocialServiceError> {
    let usecase = RejectFriendRequestUseCase {
        requests: state.friend_request_repo(),
    };
    usecase.execute(request_id, identity.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
