use axum::{
    Json,
    extract::{RawQuery, State},
};

use serde::Serialize;

use amora_auth_types::identity::Identity;

use crate::domain::types::{CorePreferences, MatchedProfile, UpsertMode};
use crate::error::SocialServiceError;
use crate::handlers::profile::ProfileResponse;
use crate::state::AppState;
use crate::usecase::matching::{GetMatchesUseCase, SaveCorePreferencesUseCase};

// ── GET /user/matches ────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct MatchedProfileResponse {
    #[serde(flatten)]
    pub profile: ProfileResponse,
    pub score: f64,
    pub reasons: serde_json::Value,
}

impl From<MatchedProfile> for MatchedProfileResponse {
    fn from(m: MatchedProfile) -> Self {
        Self {
            profile: m.profile.into(),
            score: m.score,
            reasons: m.reasons,
        }
    }
}

pub async fn get_matches(
    identity: Identity,
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Json<Vec<MatchedProfileResponse>>, SocialServiceError> {
    let usecase = GetMatchesUseCase {
        matching: state.match_client.clone(),
        profiles: state.profile_repo(),
    };
    let matches = usecase
        .execute(identity.user_id, query.as_deref())
        .await?;
    Ok(Json(matches.into_iter().map(Into::into).collect()))
}

// ── POST /user/core-preferences, PUT /user/core-preferences ──────────────────

pub async fn create_core_preferences(
    identity: Identity,
    State(state): State<AppState>,
    Json(body): Json<CorePreferences>,
) -> Result<Json<CorePreferences>, SocialServiceError> {
    save(identity, state, body, UpsertMode::Create).await
}

pub async fn update_core_preferences(
    identity: Identity,
    State(state): State<AppState>,
    Json(body): Json<CorePreferences>,
) -> Result<Json<CorePreferences>, SocialServiceError> {
    save(identity, state, body, UpsertMode::Replace).await
}

async fn save(
    identity: Identity,
    state: AppState,
    prefs: CorePreferences,
    mode: UpsertMode,
) -> Result<Json<CorePreferences>, SocialServiceError> {
    let usecase = SaveCorePreferencesUseCase {
        matching: state.match_client.clone(),
    };
    let saved = usecase.execute(identity.user_id, prefs, mode).await?;
    Ok(Json(saved))
}
