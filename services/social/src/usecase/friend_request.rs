use uuid::Uuid;

use crate::domain::repository::{FriendRequestRepository, UserRepository};
use crate::domain::types::{ConversationIntent, FriendRequest};
use crate::error::SocialServiceError;

// ── SendFriendRequest ────────────────────────────────────────────────────────

pub struct SendFriendRequestUseCase<U: UserRepository, F: FriendRequestRepository> {
    pub users: U,
    pub requests: F,
}

impl<U: UserRepository, F: FriendRequestRepository> SendFriendRequestUseCase<U, F> {
    pub async fn execute(
        &self,
        sender_id: i64,
        receiver_id: i64,
    ) -> Result<FriendRequest, SocialServiceError> {
        if sender_id == receiver_id {
            return Err(SocialServiceError::CannotRequestSelf);
        }
        self.users
            .find_by_id(receiver_id)
            .await?
            .filter(|u| u.is_active)
            .ok_or(SocialServiceError::UserNotFound)?;
        if self
            .requests
            .find_between(sender_id, receiver_id)
            .await?
            .is_some()
        {
            return Err(SocialServiceError::FriendRequestExists);
        }
        self.requests.create(sender_id, receiver_id).await
    }
}

// ── CheckRequestStatus ───────────────────────────────────────────────────────

pub struct CheckRequestStatusUseCase<F: FriendRequestRepository> {
    pub requests: F,
}

impl<F: FriendRequestRepository> CheckRequestStatusUseCase<F> {
    /// The request the caller sent to `receiver_id`, in any state.
    pub async fn execute(
        &self,
        sender_id: i64,
        receiver_id: i64,
    ) -> Result<Option<FriendRequest>, SocialServiceError> {
        self.requests.find_between(sender_id, receiver_id).await
    }
}

// ── AcceptFriendRequest ──────────────────────────────────────────────────────

pub struct AcceptFriendRequestUseCase<F: FriendRequestRepository> {
    pub requests: F,
}

impl<F: FriendRequestRepository> AcceptFriendRequestUseCase<F> {
    /// Accepts the request and commits the conversation intent with it.
    pub async fn execute(
        &self,
        request_id: i64,
        receiver_id: i64,
    ) -> Result<ConversationIntent, SocialServiceError> {
        let intent = self
            .requests
            .accept_with_outbox(request_id, receiver_id, Uuid::new_v4())
            .await?;
        tracing::info!(
            request_id,
            event_id = %intent.event_id,
            user1_id = intent.user1_id,
            user2_id = intent.user2_id,
            "friend request accepted"
        );
        Ok(intent)
    }
}

// ── RejectFriendRequest ──────────────────────────────────────────────────────

pub struct RejectFriendRequestUseCase<F: FriendRequestRepository> {
    pub requests: F,
}

impl<F: FriendRequestRepository> RejectFriendRequestUseCase<F> {
    pub async fn execute(&self, request_id: i64, receiver_id: i64) -> Result<(), SocialServiceError> {
        self.requests.reject(request_id, receiver_id).await
    }
}

// ── ListFriendRequests ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestDirection {
    /// Pending requests addressed to the caller.
    Received,
    /// Every request the caller has sent, in any state.
    Sent,
}

pub struct ListFriendRequestsUseCase<F: FriendRequestRepository> {
    pub requests: F,
}

impl<F: FriendRequestRepository> ListFriendRequestsUseCase<F> {
    pub async fn execute(
        &self,
        user_id: i64,
        direction: RequestDirection,
    ) -> Result<Vec<FriendRequest>, SocialServiceError> {
        match direction {
            RequestDirection::Received => self.requests.list_pending_for(user_id).await,
            RequestDirection::Sent => self.requests.list_sent_by(user_id).await,
        }
    }
}
