use amora_domain::lifecycle::LifecycleEventType;

use crate::domain::repository::UserRepository;
use crate::domain::types::{LifecycleIntent, User};
use crate::error::SocialServiceError;

// ── GetUserStatus ────────────────────────────────────────────────────────────

pub struct GetUserStatusUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> GetUserStatusUseCase<U> {
    /// Deactivated accounts are still found; only deleted ones are not.
    pub async fn execute(&self, user_id: i64) -> Result<User, SocialServiceError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(SocialServiceError::UserNotFound)
    }
}

// ── ChangeLifecycle ──────────────────────────────────────────────────────────

/// Deactivate, reactivate or delete an account, announcing the change through the
/// lifecycle outbox. The account change and the event commit or fail together.
pub struct ChangeLifecycleUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> ChangeLifecycleUseCase<U> {
    pub async fn execute(
        &self,
        user_id: i64,
        event_type: LifecycleEventType,
        reason: Option<&str>,
    ) -> Result<LifecycleIntent, SocialServiceError> {
        let intent = LifecycleIntent::new(user_id, event_type, reason);
        match event_type {
            LifecycleEventType::Deactivated => self.users.deactivate_with_outbox(&intent).await?,
            LifecycleEventType::Reactivated => self.users.reactivate_with_outbox(&intent).await?,
            LifecycleEventType::Deleted => self.users.delete_with_outbox(&intent).await?,
        }
        tracing::info!(
            user_id,
            event_id = %intent.event_id,
            %event_type,
            "account lifecycle changed"
        );
        Ok(intent)
    }
}
