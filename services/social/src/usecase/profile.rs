use crate::domain::repository::ProfileRepository;
use crate::domain::types::{Profile, ProfileInput, ProfileSyncIntent};
use crate::error::SocialServiceError;

// ── GetProfile ───────────────────────────────────────────────────────────────

pub struct GetProfileUseCase<P: ProfileRepository> {
    pub profiles: P,
}

impl<P: ProfileRepository> GetProfileUseCase<P> {
    pub async fn execute(&self, user_id: i64) -> Result<Profile, SocialServiceError> {
        self.profiles
            .find_by_user_id(user_id)
            .await?
            .ok_or(SocialServiceError::ProfileNotFound)
    }
}

// ── SaveProfile ──────────────────────────────────────────────────────────────

pub struct SaveProfileUseCase<P: ProfileRepository> {
    pub profiles: P,
}

impl<P: ProfileRepository> SaveProfileUseCase<P> {
    /// Upsert the caller's profile; the matching service picks it up asynchronously.
    pub async fn execute(
        &self,
        user_id: i64,
        input: ProfileInput,
    ) -> Result<Profile, SocialServiceError> {
        let intent = ProfileSyncIntent::new(user_id);
        self.profiles
            .upsert_with_sync(user_id, &input, &intent)
            .await
    }
}

// ── RequestProfileSync ───────────────────────────────────────────────────────

pub struct RequestProfileSyncUseCase<P: ProfileRepository> {
    pub profiles: P,
}

impl<P: ProfileRepository> RequestProfileSyncUseCase<P> {
    pub async fn execute(&self, user_id: i64) -> Result<ProfileSyncIntent, SocialServiceError> {
        self.profiles
            .find_by_user_id(user_id)
            .await?
            .ok_or(SocialServiceError::ProfileNotFound)?;
        let intent = ProfileSyncIntent::new(user_id);
        self.profiles.request_sync(&intent).await?;
        Ok(intent)
    }
}
