use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use uuid::Uuid;

use amora_auth_types::identity::Identity;

use crate::domain::types::{Profile, ProfileInput};
use crate::error::SocialServiceError;
use crate::state::AppState;
use crate::usecase::profile::{GetProfileUseCase, RequestProfileSyncUseCase, SaveProfileUseCase};

#[derive(Serialize)]
pub struct ProfileResponse {
    pub user_id: i64,
    pub bio: String,
    pub gender: String,
    pub date_of_birth: Option<String>,
    pub interests: Vec<String>,
    pub languages: Vec<String>,
    pub country_code: String,
    pub city: String,
    #[serde(serialize_with = "amora_core::serde::to_rfc3339_ms_opt")]
    pub match_synced_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(serialize_with = "amora_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Profile> for ProfileResponse {
    fn from(p: Profile) -> Self {
        Self {
            user_id: p.user_id,
            bio: p.bio,
            gender: p.gender,
            date_of_birth: p.date_of_birth,
            interests: p.interests,
            languages: p.languages,
            country_code: p.country_code,
            city: p.city,
            match_synced_at: p.match_synced_at,
            updated_at: p.updated_at,
        }
    }
}

// ── GET /profile ─────────────────────────────────────────────────────────────

pub async fn get_profile(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<ProfileResponse>, SocialServiceError> {
    let usecase = GetProfileUseCase {
        profiles: state.profile_repo(),
    };
    let profile = usecase.execute(identity.user_id).await?;
    Ok(Json(profile.into()))
}

// ── PUT /user/profile ────────────────────────────────────────────────────────

pub async fn save_profile(
    identity: Identity,
    State(state): State<AppState>,
    Json(body): Json<ProfileInput>,
) -> Result<Json<ProfileResponse>, SocialServiceError> {
    let usecase = SaveProfileUseCase {
        profiles: state.profile_repo(),
    };
    let saved = usecase.execute(identity.user_id, body).await?;
    state.outbox_signal.notify();
    Ok(Json(saved.into()))
}

// ── POST /user/profile/sync ──────────────────────────────────────────────────

#[derive(Serialize)]
pub struct SyncRequestedResponse {
    pub event_id: Uuid,
}

pub async fn request_profile_sync(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<SyncRequestedResponse>), SocialServiceError> {
    let usecase = RequestProfileSyncUseCase {
        profiles: state.profile_repo(),
    };
    let intent = usecase.execute(identity.user_id).await?;
    state.outbox_signal.notify();
    Ok((
        StatusCode::ACCEPTED,
        Json(SyncRequestedResponse {
            event_id: intent.event_id,
        }),
    ))
}
