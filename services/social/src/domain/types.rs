use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use amora_domain::friend_request::FriendRequestStatus;
use amora_domain::lifecycle::LifecycleEventType;

// ── Outbox intents ───────────────────────────────────────────────────────────

/// Which outbox table a row lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutboxKind {
    Conversation,
    ProfileSync,
    Lifecycle,
}

impl OutboxKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Conversation => "conversation",
            Self::ProfileSync => "profile_sync",
            Self::Lifecycle => "lifecycle",
        }
    }
}

/// "Create a conversation between these two users", written on friend-request acceptance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationIntent {
    pub event_id: Uuid,
    /// Sender of the accepted request; the conversation is created on their behalf.
    pub user1_id: i64,
    /// Receiver of the accepted request.
    pub user2_id: i64,
    pub attempts: i32,
    pub created_at: DateTime<Utc>,
}

impl ConversationIntent {
    pub fn new(event_id: Uuid, user1_id: i64, user2_id: i64) -> Self {
        Self {
            event_id,
            user1_id,
            user2_id,
            attempts: 0,
            created_at: Utc::now(),
        }
    }
}

/// "Push this user's profile to the matching service".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileSyncIntent {
    pub event_id: Uuid,
    pub user_id: i64,
    pub attempts: i32,
    pub created_at: DateTime<Utc>,
}

impl ProfileSyncIntent {
    pub fn new(user_id: i64) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            user_id,
            attempts: 0,
            created_at: Utc::now(),
        }
    }
}

/// Account state change announced to broker subscribers.
#[derive(Debug, Clone, PartialEq)]
pub struct LifecycleIntent {
    pub event_id: Uuid,
    pub user_id: i64,
    pub event_type: LifecycleEventType,
    pub payload: serde_json::Value,
    pub attempts: i32,
    pub created_at: DateTime<Utc>,
}

impl LifecycleIntent {
    pub fn new(user_id: i64, event_type: LifecycleEventType, reason: Option<&str>) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            user_id,
            event_type,
            payload: lifecycle_payload(reason),
            attempts: 0,
            created_at: Utc::now(),
        }
    }
}

/// `{"reason": "<trimmed>"}`, or `{}` when the reason is absent or blank.
pub fn lifecycle_payload(reason: Option<&str>) -> serde_json::Value {
    match reason.map(str::trim).filter(|r| !r.is_empty()) {
        Some(reason) => serde_json::json!({ "reason": reason }),
        None => serde_json::json!({}),
    }
}

// ── Users and friend requests ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FriendRequest {
    pub id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub status: FriendRequestStatus,
    /// Set once the conversation service has created the pair's conversation.
    pub conversation_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ── Profiles ─────────────────────────────────────────────────────────────────

/// Editable profile fields as submitted by the owner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProfileInput {
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub gender: String,
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub country_code: String,
    #[serde(default)]
    pub city: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub user_id: i64,
    pub bio: String,
    pub gender: String,
    pub date_of_birth: Option<String>,
    pub interests: Vec<String>,
    pub languages: Vec<String>,
    pub country_code: String,
    pub city: String,
    /// Last successful push to the matching service.
    pub match_synced_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Whether the matching service should create or replace its copy.
    pub fn upsert_mode(&self) -> UpsertMode {
        match self.match_synced_at {
            Some(_) => UpsertMode::Replace,
            None => UpsertMode::Create,
        }
    }

    pub fn document(&self) -> MatchProfileDocument<'_> {
        MatchProfileDocument {
            user_id: self.user_id,
            bio: &self.bio,
            gender: &self.gender,
            date_of_birth: self.date_of_birth.as_deref(),
            interests: &self.interests,
            languages: &self.languages,
            country_code: &self.country_code,
            city: &self.city,
        }
    }
}

/// Body sent to `POST`/`PUT /profiles` on the matching service.
#[derive(Debug, Serialize)]
pub struct MatchProfileDocument<'a> {
    pub user_id: i64,
    pub bio: &'a str,
    pub gender: &'a str,
    pub date_of_birth: Option<&'a str>,
    pub interests: &'a [String],
    pub languages: &'a [String],
    pub country_code: &'a str,
    pub city: &'a str,
}

/// HTTP verb selection for a profile push: `POST` for first sync, `PUT` afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertMode {
    Create,
    Replace,
}

// ── Matching service documents ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    pub user_id: i64,
    pub score: f64,
    #[serde(default)]
    pub reasons: serde_json::Value,
}

/// A match candidate joined with the candidate's local profile.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedProfile {
    pub profile: Profile,
    pub score: f64,
    pub reasons: serde_json::Value,
}

/// Partner preferences stored by the matching service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorePreferences {
    #[serde(rename = "user_id", default)]
    pub user_id: i64,
    #[serde(default)]
    pub min_age: i32,
    #[serde(default)]
    pub max_age: i32,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub drinking_habit: String,
    #[serde(default)]
    pub education_level: String,
    #[serde(default)]
    pub smoking_habit: String,
    #[serde(default)]
    pub country_of_residence: String,
    #[serde(default)]
    pub occupation_status: String,
    #[serde(default)]
    pub civil_status: String,
    #[serde(default)]
    pub religion: String,
    #[serde(default)]
    pub min_height: i32,
    #[serde(default)]
    pub max_height: i32,
    #[serde(default)]
    pub food_preference: String,
}
