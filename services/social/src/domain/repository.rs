#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::types::{
    ConversationIntent, CorePreferences, FriendRequest, LifecycleIntent, MatchCandidate,
    OutboxKind, Profile, ProfileInput, ProfileSyncIntent, UpsertMode, User,
};
use crate::error::{DeliveryError, SocialServiceError};

// ── Request-path repositories ────────────────────────────────────────────────

/// User accounts. Every state change commits together with its lifecycle intent.
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, SocialServiceError>;

    /// Flip an active account to inactive and enqueue `intent` in the same transaction.
    /// Returns `UserNotFound` if no active account matched.
    async fn deactivate_with_outbox(
        &self,
        intent: &LifecycleIntent,
    ) -> Result<(), SocialServiceError>;

    /// Flip an inactive account back to active and enqueue `intent` in the same transaction.
    /// Returns `UserNotFound` if no inactive account matched.
    async fn reactivate_with_outbox(
        &self,
        intent: &LifecycleIntent,
    ) -> Result<(), SocialServiceError>;

    /// Enqueue `intent`, then remove the account, in one transaction.
    async fn delete_with_outbox(&self, intent: &LifecycleIntent)
    -> Result<(), SocialServiceError>;
}

/// Friend-request handshakes.
pub trait FriendRequestRepository: Send + Sync {
    async fn find_between(
        &self,
        sender_id: i64,
        receiver_id: i64,
    ) -> Result<Option<FriendRequest>, SocialServiceError>;

    async fn create(
        &self,
        sender_id: i64,
        receiver_id: i64,
    ) -> Result<FriendRequest, SocialServiceError>;

    /// Accept a pending request addressed to `receiver_id` and enqueue a conversation
    /// intent keyed by `event_id`, atomically. Nothing is written if the request is not
    /// pending or its participants cannot be resolved.
    async fn accept_with_outbox(
        &self,
        request_id: i64,
        receiver_id: i64,
        event_id: Uuid,
    ) -> Result<ConversationIntent, SocialServiceError>;

    /// Reject a pending request addressed to `receiver_id`.
    async fn reject(&self, request_id: i64, receiver_id: i64) -> Result<(), SocialServiceError>;

    async fn list_pending_for(
        &self,
        receiver_id: i64,
    ) -> Result<Vec<FriendRequest>, SocialServiceError>;

    async fn list_sent_by(&self, sender_id: i64) -> Result<Vec<FriendRequest>, SocialServiceError>;
}

/// Profiles. Saves commit together with a profile-sync intent.
pub trait ProfileRepository: Send + Sync {
    async fn find_by_user_id(&self, user_id: i64) -> Result<Option<Profile>, SocialServiceError>;

    /// Profiles for whichever of `user_ids` have one, in no particular order.
    async fn find_by_user_ids(
        &self,
        user_ids: &[i64],
    ) -> Result<Vec<Profile>, SocialServiceError>;

    async fn upsert_with_sync(
        &self,
        user_id: i64,
        input: &ProfileInput,
        intent: &ProfileSyncIntent,
    ) -> Result<Profile, SocialServiceError>;

    /// Enqueue a resync without touching the profile row.
    async fn request_sync(&self, intent: &ProfileSyncIntent) -> Result<(), SocialServiceError>;
}

// ── Worker-side outbox store ─────────────────────────────────────────────────

/// Polling and completion for the three outbox tables.
///
/// `fetch_*` return at most `limit` unprocessed rows, oldest first. When `max_attempts`
/// is set, rows that have already failed that many times are skipped.
pub trait OutboxStore: Send + Sync {
    async fn fetch_pending_conversations(
        &self,
        limit: u64,
        max_attempts: Option<i32>,
    ) -> Result<Vec<ConversationIntent>, SocialServiceError>;

    /// Store the external id on the outbox row, link it into the friend request between
    /// the two users, and mark the row processed, atomically.
    async fn complete_conversation(
        &self,
        intent: &ConversationIntent,
        conversation_id: Uuid,
    ) -> Result<(), SocialServiceError>;

    async fn fetch_pending_profile_syncs(
        &self,
        limit: u64,
        max_attempts: Option<i32>,
    ) -> Result<Vec<ProfileSyncIntent>, SocialServiceError>;

    /// Current profile snapshot, read at delivery time.
    async fn load_profile(&self, user_id: i64) -> Result<Option<Profile>, SocialServiceError>;

    /// Mark processed and stamp the profile's `match_synced_at`, atomically.
    async fn complete_profile_sync(
        &self,
        intent: &ProfileSyncIntent,
        synced_at: DateTime<Utc>,
    ) -> Result<(), SocialServiceError>;

    /// Mark processed without delivery (the profile no longer exists).
    async fn discard_profile_sync(&self, event_id: Uuid) -> Result<(), SocialServiceError>;

    async fn fetch_pending_lifecycle(
        &self,
        limit: u64,
        max_attempts: Option<i32>,
    ) -> Result<Vec<LifecycleIntent>, SocialServiceError>;

    async fn complete_lifecycle(
        &self,
        event_id: Uuid,
        processed_at: DateTime<Utc>,
    ) -> Result<(), SocialServiceError>;

    /// Bump `attempts` and store `error` on a row that stays pending.
    async fn record_failure(
        &self,
        kind: OutboxKind,
        event_id: Uuid,
        error: &str,
    ) -> Result<(), SocialServiceError>;
}

// ── Delivery ports ───────────────────────────────────────────────────────────

/// Conversation service. Must be idempotent on `intent.event_id`.
pub trait ConversationPort: Send + Sync {
    async fn create_conversation(&self, intent: &ConversationIntent)
    -> Result<Uuid, DeliveryError>;
}

/// Matching service profile upsert.
pub trait ProfileSyncPort: Send + Sync {
    async fn upsert_profile(&self, profile: &Profile, mode: UpsertMode)
    -> Result<(), DeliveryError>;
}

/// Broker publish for lifecycle events. Returns once the broker has confirmed.
pub trait LifecyclePublisher: Send + Sync {
    async fn publish(&self, intent: &LifecycleIntent) -> Result<(), DeliveryError>;
}

/// Matching service reads and preference writes proxied for the caller.
pub trait MatchQueryPort: Send + Sync {
    async fn get_matches(
        &self,
        user_id: i64,
        raw_query: Option<&str>,
    ) -> Result<Vec<MatchCandidate>, DeliveryError>;

    async fn save_core_preferences(
        &self,
        prefs: &CorePreferences,
    ) -> Result<CorePreferences, DeliveryError>;

    async fn update_core_preferences(
        &self,
        prefs: &CorePreferences,
    ) -> Result<CorePreferences, DeliveryError>;
}
