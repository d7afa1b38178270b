use std::sync::Arc;

use sea_orm::DatabaseConnection;

use amora_auth_types::identity::JwtSecretProvider;

use crate::infra::db::{DbFriendRequestRepository, DbProfileRepository, DbUserRepository};
use crate::infra::matching::HttpMatchClient;
use crate::worker::OutboxSignal;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    /// Shared connection pool; repositories borrow it through `as_ref()`.
    pub db: Arc<DatabaseConnection>,
    pub jwt_secret: String,
    pub match_client: HttpMatchClient,
    /// Nudged after every committed outbox row.
    pub outbox_signal: OutboxSignal,
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn friend_request_repo(&self) -> DbFriendRequestRepository {
        DbFriendRequestRepository {
            db: self.db.clone(),
        }
    }

    pub fn profile_repo(&self) -> DbProfileRepository {
        DbProfileRepository {
            db: self.db.clone(),
        }
    }
}

impl JwtSecretProvider for AppState {
    fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }
}
