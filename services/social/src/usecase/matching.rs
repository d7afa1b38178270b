use std::collections::HashMap;

use tracing::debug;

use crate::domain::repository::{MatchQueryPort, ProfileRepository};
use crate::domain::types::{CorePreferences, MatchedProfile, UpsertMode};
use crate::error::SocialServiceError;

// ── GetMatches ───────────────────────────────────────────────────────────────

pub struct GetMatchesUseCase<Q: MatchQueryPort, P: ProfileRepository> {
    pub matching: Q,
    pub profiles: P,
}

impl<Q: MatchQueryPort, P: ProfileRepository> GetMatchesUseCase<Q, P> {
    /// `raw_query` is forwarded verbatim (filters and paging are the matching service's).
    /// Candidates keep the matching service's order; those without a local profile are dropped.
    pub async fn execute(
        &self,
        user_id: i64,
        raw_query: Option<&str>,
    ) -> Result<Vec<MatchedProfile>, SocialServiceError> {
        let candidates = self.matching.get_matches(user_id, raw_query).await?;
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = candidates.iter().map(|c| c.user_id).collect();
        let mut profiles: HashMap<i64, _> = self
            .profiles
            .find_by_user_ids(&ids)
            .await?
            .into_iter()
            .map(|p| (p.user_id, p))
            .collect();

        let matched = candidates
            .into_iter()
            .filter_map(|candidate| match profiles.remove(&candidate.user_id) {
                Some(profile) => Some(MatchedProfile {
                    profile,
                    score: candidate.score,
                    reasons: candidate.reasons,
                }),
                None => {
                    debug!(candidate_id = candidate.user_id, "match candidate has no profile");
                    None
                }
            })
            .collect();
        Ok(matched)
    }
}

// ── SaveCorePreferences ──────────────────────────────────────────────────────

pub struct SaveCorePreferencesUseCase<Q: MatchQueryPort> {
    pub matching: Q,
}

impl<Q: MatchQueryPort> SaveCorePreferencesUseCase<Q> {
    /// The owner is always the caller, whatever `user_id` the body carried.
    pub async fn execute(
        &self,
        user_id: i64,
        mut prefs: CorePreferences,
        mode: UpsertMode,
    ) -> Result<CorePreferences, SocialServiceError> {
        prefs.user_id = user_id;
        let saved = match mode {
            UpsertMode::Create => self.matching.save_core_preferences(&prefs).await?,
            UpsertMode::Replace => self.matching.update_core_preferences(&prefs).await?,
        };
        Ok(saved)
    }
}
