use std::sync::Arc;

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ActiveValue::Set, ColumnTrait, DatabaseConnection,
    DatabaseTransaction, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect, SqlErr,
    TransactionError, TransactionTrait, sea_query::Expr,
};
use uuid::Uuid;

use amora_domain::friend_request::FriendRequestStatus;
use amora_domain::lifecycle::LifecycleEventType;
use amora_social_schema::{
    conversation_outbox, friend_requests, profile_sync_outbox, profiles, user_lifecycle_outbox,
    users,
};

use crate::domain::repository::{
    FriendRequestRepository, OutboxStore, ProfileRepository, UserRepository,
};
use crate::domain::types::{
    ConversationIntent, FriendRequest, LifecycleIntent, OutboxKind, Profile, ProfileInput,
    ProfileSyncIntent, User,
};
use crate::error::SocialServiceError;

/// Reasons a transaction body bails out. Any of them rolls the whole transaction back.
#[derive(Debug, thiserror::Error)]
enum TxError {
    #[error("user not found")]
    UserNotFound,
    #[error("friend request not found")]
    FriendRequestNotFound,
    #[error(transparent)]
    Db(#[from] DbErr),
}

fn map_tx_error(e: TransactionError<TxError>, context: &'static str) -> SocialServiceError {
    match e {
        TransactionError::Transaction(TxError::UserNotFound) => SocialServiceError::UserNotFound,
        TransactionError::Transaction(TxError::FriendRequestNotFound) => {
            SocialServiceError::FriendRequestNotFound
        }
        TransactionError::Transaction(TxError::Db(e)) | TransactionError::Connection(e) => {
            SocialServiceError::Internal(anyhow::Error::new(e).context(context))
        }
    }
}

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: Arc<DatabaseConnection>,
}

#[derive(Debug, Clone, Copy)]
enum AccountChange {
    Deactivate,
    Reactivate,
    Delete,
}

impl DbUserRepository {
    async fn change_with_outbox(
        &self,
        change: AccountChange,
        intent: &LifecycleIntent,
    ) -> Result<(), SocialServiceError> {
        let intent = intent.clone();
        self.db
            .transaction::<_, (), TxError>(|txn| {
                Box::pin(async move {
                    let user_id = intent.user_id;
                    match change {
                        AccountChange::Deactivate => {
                            let res = users::Entity::update_many()
                                .col_expr(users::Column::IsActive, Expr::value(false))
                                .col_expr(
                                    users::Column::DeactivatedAt,
                                    Expr::value(Some(Utc::now())),
                                )
                                .filter(users::Column::Id.eq(user_id))
                                .filter(users::Column::IsActive.eq(true))
                                .exec(txn)
                                .await?;
                            if res.rows_affected == 0 {
                                return Err(TxError::UserNotFound);
                            }
                            insert_lifecycle_intent(txn, &intent).await?;
                        }
                        AccountChange::Reactivate => {
                            let res = users::Entity::update_many()
                                .col_expr(users::Column::IsActive, Expr::value(true))
                                .col_expr(
                                    users::Column::DeactivatedAt,
                                    Expr::value(Option::<DateTime<Utc>>::None),
                                )
                                .filter(users::Column::Id.eq(user_id))
                                .filter(users::Column::IsActive.eq(false))
                                .exec(txn)
                                .await?;
                            if res.rows_affected == 0 {
                                return Err(TxError::UserNotFound);
                            }
                            insert_lifecycle_intent(txn, &intent).await?;
                        }
                        AccountChange::Delete => {
                            // The event row has no FK to users, so it survives the delete.
                            insert_lifecycle_intent(txn, &intent).await?;
                            let res = users::Entity::delete_many()
                                .filter(users::Column::Id.eq(user_id))
                                .exec(txn)
                                .await?;
                            if res.rows_affected == 0 {
                                return Err(TxError::UserNotFound);
                            }
                        }
                    }
                    Ok(())
                })
            })
            .await
            .map_err(|e| map_tx_error(e, "change account state with outbox"))
    }
}

impl UserRepository for DbUserRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, SocialServiceError> {
        let model = users::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .context("find user by id")?;
        Ok(model.map(user_from_model))
    }

    async fn deactivate_with_outbox(
        &self,
        intent: &LifecycleIntent,
    ) -> Result<(), SocialServiceError> {
        self.change_with_outbox(AccountChange::Deactivate, intent)
            .await
    }

    async fn reactivate_with_outbox(
        &self,
        intent: &LifecycleIntent,
    ) -> Result<(), SocialServiceError> {
        self.change_with_outbox(AccountChange::Reactivate, intent)
            .await
    }

    async fn delete_with_outbox(
        &self,
        intent: &LifecycleIntent,
    ) -> Result<(), SocialServiceError> {
        self.change_with_outbox(AccountChange::Delete, intent).await
    }
}

fn user_from_model(model: users::Model) -> User {
    User {
        id: model.id,
        username: model.username,
        email: model.email,
        is_active: model.is_active,
    }
}

// ── Friend request repository ────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbFriendRequestRepository {
    pub db: Arc<DatabaseConnection>,
}

impl FriendRequestRepository for DbFriendRequestRepository {
    async fn find_between(
        &self,
        sender_id: i64,
        receiver_id: i64,
    ) -> Result<Option<FriendRequest>, SocialServiceError> {
        let model = friend_requests::Entity::find()
            .filter(friend_requests::Column::SenderId.eq(sender_id))
            .filter(friend_requests::Column::ReceiverId.eq(receiver_id))
            .one(self.db.as_ref())
            .await
            .context("find friend request between users")?;
        model.map(friend_request_from_model).transpose()
    }

    async fn create(
        &self,
        sender_id: i64,
        receiver_id: i64,
    ) -> Result<FriendRequest, SocialServiceError> {
        let now = Utc::now();
        let result = friend_requests::ActiveModel {
            id: NotSet,
            sender_id: Set(sender_id),
            receiver_id: Set(receiver_id),
            status: Set(FriendRequestStatus::Pending.as_str().to_owned()),
            conversation_id: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.db.as_ref())
        .await;
        match result {
            Ok(model) => friend_request_from_model(model),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Err(SocialServiceError::FriendRequestExists)
            }
            Err(e) => Err(anyhow::Error::new(e).context("create friend request").into()),
        }
    }

    async fn accept_with_outbox(
        &self,
        request_id: i64,
        receiver_id: i64,
        event_id: Uuid,
    ) -> Result<ConversationIntent, SocialServiceError> {
        self.db
            .transaction::<_, ConversationIntent, TxError>(|txn| {
                Box::pin(async move {
                    let res = friend_requests::Entity::update_many()
                        .col_expr(
                            friend_requests::Column::Status,
                            Expr::value(FriendRequestStatus::Accepted.as_str()),
                        )
                        .col_expr(friend_requests::Column::UpdatedAt, Expr::value(Utc::now()))
                        .filter(friend_requests::Column::Id.eq(request_id))
                        .filter(friend_requests::Column::ReceiverId.eq(receiver_id))
                        .filter(
                            friend_requests::Column::Status
                                .eq(FriendRequestStatus::Pending.as_str()),
                        )
                        .exec(txn)
                        .await?;
                    if res.rows_affected == 0 {
                        return Err(TxError::FriendRequestNotFound);
                    }

                    let request = friend_requests::Entity::find_by_id(request_id)
                        .one(txn)
                        .await?
                        .ok_or(TxError::FriendRequestNotFound)?;

                    let participants = users::Entity::find()
                        .filter(
                            users::Column::Id.is_in([request.sender_id, request.receiver_id]),
                        )
                        .all(txn)
                        .await?;
                    let resolved = |id: i64| participants.iter().any(|u| u.id == id);
                    if !resolved(request.sender_id) || !resolved(request.receiver_id) {
                        return Err(TxError::UserNotFound);
                    }

                    let intent =
                        ConversationIntent::new(event_id, request.sender_id, request.receiver_id);
                    insert_conversation_intent(txn, &intent).await?;
                    Ok(intent)
                })
            })
            .await
            .map_err(|e| map_tx_error(e, "accept friend request with outbox"))
    }

    async fn reject(&self, request_id: i64, receiver_id: i64) -> Result<(), SocialServiceError> {
        let res = friend_requests::Entity::update_many()
            .col_expr(
                friend_requests::Column::Status,
                Expr::value(FriendRequestStatus::Rejected.as_str()),
            )
            .col_expr(friend_requests::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(friend_requests::Column::Id.eq(request_id))
            .filter(friend_requests::Column::ReceiverId.eq(receiver_id))
            .filter(friend_requests::Column::Status.eq(FriendRequestStatus::Pending.as_str()))
            .exec(self.db.as_ref())
            .await
            .context("reject friend request")?;
        if res.rows_affected == 0 {
            return Err(SocialServiceError::FriendRequestNotFound);
        }
        Ok(())
    }

    async fn list_pending_for(
        &self,
        receiver_id: i64,
    ) -> Result<Vec<FriendRequest>, SocialServiceError> {
        let models = friend_requests::Entity::find()
            .filter(friend_requests::Column::ReceiverId.eq(receiver_id))
            .filter(friend_requests::Column::Status.eq(FriendRequestStatus::Pending.as_str()))
            .order_by_desc(friend_requests::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .context("list pending friend requests")?;
        models.into_iter().map(friend_request_from_model).collect()
    }

    async fn list_sent_by(&self, sender_id: i64) -> Result<Vec<FriendRequest>, SocialServiceError> {
        let models = friend_requests::Entity::find()
            .filter(friend_requests::Column::SenderId.eq(sender_id))
            .order_by_desc(friend_requests::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .context("list sent friend requests")?;
        models.into_iter().map(friend_request_from_model).collect()
    }
}

fn friend_request_from_model(
    model: friend_requests::Model,
) -> Result<FriendRequest, SocialServiceError> {
    let status = model
        .status
        .parse::<FriendRequestStatus>()
        .context("decode friend request status")?;
    Ok(FriendRequest {
        id: model.id,
        sender_id: model.sender_id,
        receiver_id: model.receiver_id,
        status,
        conversation_id: model.conversation_id,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

// ── Profile repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbProfileRepository {
    pub db: Arc<DatabaseConnection>,
}

impl ProfileRepository for DbProfileRepository {
    async fn find_by_user_id(&self, user_id: i64) -> Result<Option<Profile>, SocialServiceError> {
        let model = profiles::Entity::find_by_id(user_id)
            .one(self.db.as_ref())
            .await
            .context("find profile")?;
        model.map(profile_from_model).transpose()
    }

    async fn find_by_user_ids(
        &self,
        user_ids: &[i64],
    ) -> Result<Vec<Profile>, SocialServiceError> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = profiles::Entity::find()
            .filter(profiles::Column::UserId.is_in(user_ids.iter().copied()))
            .all(self.db.as_ref())
            .await
            .context("find profiles")?;
        models.into_iter().map(profile_from_model).collect()
    }

    async fn upsert_with_sync(
        &self,
        user_id: i64,
        input: &ProfileInput,
        intent: &ProfileSyncIntent,
    ) -> Result<Profile, SocialServiceError> {
        let input = input.clone();
        let intent = intent.clone();
        let model = self
            .db
            .transaction::<_, profiles::Model, TxError>(|txn| {
                Box::pin(async move {
                    let existing = profiles::Entity::find_by_id(user_id).one(txn).await?;
                    let mut am = profiles::ActiveModel {
                        user_id: Set(user_id),
                        bio: Set(input.bio),
                        gender: Set(input.gender),
                        date_of_birth: Set(input.date_of_birth),
                        interests: Set(serde_json::Value::from(input.interests)),
                        languages: Set(serde_json::Value::from(input.languages)),
                        country_code: Set(input.country_code),
                        city: Set(input.city),
                        match_synced_at: NotSet,
                        updated_at: Set(Utc::now()),
                    };
                    let model = match existing {
                        Some(_) => am.update(txn).await?,
                        None => {
                            am.match_synced_at = Set(None);
                            am.insert(txn).await?
                        }
                    };
                    insert_profile_sync_intent(txn, &intent).await?;
                    Ok(model)
                })
            })
            .await
            .map_err(|e| map_tx_error(e, "save profile with sync outbox"))?;
        profile_from_model(model)
    }

    async fn request_sync(&self, intent: &ProfileSyncIntent) -> Result<(), SocialServiceError> {
        profile_sync_outbox::Entity::insert(profile_sync_active_model(intent))
            .exec_without_returning(self.db.as_ref())
            .await
            .context("enqueue profile sync")?;
        Ok(())
    }
}

fn profile_from_model(model: profiles::Model) -> Result<Profile, SocialServiceError> {
    let interests = serde_json::from_value(model.interests).context("decode profile interests")?;
    let languages = serde_json::from_value(model.languages).context("decode profile languages")?;
    Ok(Profile {
        user_id: model.user_id,
        bio: model.bio,
        gender: model.gender,
        date_of_birth: model.date_of_birth,
        interests,
        languages,
        country_code: model.country_code,
        city: model.city,
        match_synced_at: model.match_synced_at,
        updated_at: model.updated_at,
    })
}

// ── Outbox inserts (always inside the caller's transaction) ──────────────────

async fn insert_conversation_intent(
    txn: &DatabaseTransaction,
    intent: &ConversationIntent,
) -> Result<(), DbErr> {
    conversation_outbox::Entity::insert(conversation_outbox::ActiveModel {
        event_id: Set(intent.event_id),
        user1_id: Set(intent.user1_id),
        user2_id: Set(intent.user2_id),
        conversation_id: Set(None),
        processed: Set(false),
        attempts: Set(0),
        last_error: Set(None),
        created_at: Set(intent.created_at),
    })
    .exec_without_returning(txn)
    .await?;
    Ok(())
}

fn profile_sync_active_model(intent: &ProfileSyncIntent) -> profile_sync_outbox::ActiveModel {
    profile_sync_outbox::ActiveModel {
        event_id: Set(intent.event_id),
        user_id: Set(intent.user_id),
        processed: Set(false),
        attempts: Set(0),
        last_error: Set(None),
        created_at: Set(intent.created_at),
    }
}

async fn insert_profile_sync_intent(
    txn: &DatabaseTransaction,
    intent: &ProfileSyncIntent,
) -> Result<(), DbErr> {
    profile_sync_outbox::Entity::insert(profile_sync_active_model(intent))
        .exec_without_returning(txn)
        .await?;
    Ok(())
}

async fn insert_lifecycle_intent(
    txn: &DatabaseTransaction,
    intent: &LifecycleIntent,
) -> Result<(), DbErr> {
    user_lifecycle_outbox::Entity::insert(user_lifecycle_outbox::ActiveModel {
        event_id: Set(intent.event_id),
        user_id: Set(intent.user_id),
        event_type: Set(intent.event_type.as_str().to_owned()),
        payload: Set(intent.payload.clone()),
        processed: Set(false),
        processed_at: Set(None),
        attempts: Set(0),
        last_error: Set(None),
        created_at: Set(intent.created_at),
    })
    .exec_without_returning(txn)
    .await?;
    Ok(())
}

// ── Outbox store (worker side) ───────────────────────────────────────────────

#[derive(Clone)]
pub struct DbOutboxStore {
    pub db: Arc<DatabaseConnection>,
}

impl OutboxStore for DbOutboxStore {
    async fn fetch_pending_conversations(
        &self,
        limit: u64,
        max_attempts: Option<i32>,
    ) -> Result<Vec<ConversationIntent>, SocialServiceError> {
        let mut query = conversation_outbox::Entity::find()
            .filter(conversation_outbox::Column::Processed.eq(false));
        if let Some(max) = max_attempts {
            query = query.filter(conversation_outbox::Column::Attempts.lt(max));
        }
        let models = query
            .order_by_asc(conversation_outbox::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .context("fetch pending conversation intents")?;
        Ok(models
            .into_iter()
            .map(|m| ConversationIntent {
                event_id: m.event_id,
                user1_id: m.user1_id,
                user2_id: m.user2_id,
                attempts: m.attempts,
                created_at: m.created_at,
            })
            .collect())
    }

    async fn complete_conversation(
        &self,
        intent: &ConversationIntent,
        conversation_id: Uuid,
    ) -> Result<(), SocialServiceError> {
        let intent = intent.clone();
        self.db
            .transaction::<_, (), TxError>(|txn| {
                Box::pin(async move {
                    conversation_outbox::Entity::update_many()
                        .col_expr(
                            conversation_outbox::Column::ConversationId,
                            Expr::value(Some(conversation_id)),
                        )
                        .col_expr(conversation_outbox::Column::Processed, Expr::value(true))
                        .filter(conversation_outbox::Column::EventId.eq(intent.event_id))
                        .exec(txn)
                        .await?;
                    friend_requests::Entity::update_many()
                        .col_expr(
                            friend_requests::Column::ConversationId,
                            Expr::value(Some(conversation_id)),
                        )
                        .col_expr(friend_requests::Column::UpdatedAt, Expr::value(Utc::now()))
                        .filter(friend_requests::Column::SenderId.eq(intent.user1_id))
                        .filter(friend_requests::Column::ReceiverId.eq(intent.user2_id))
                        .exec(txn)
                        .await?;
                    Ok(())
                })
            })
            .await
            .map_err(|e| map_tx_error(e, "complete conversation intent"))
    }

    async fn fetch_pending_profile_syncs(
        &self,
        limit: u64,
        max_attempts: Option<i32>,
    ) -> Result<Vec<ProfileSyncIntent>, SocialServiceError> {
        let mut query = profile_sync_outbox::Entity::find()
            .filter(profile_sync_outbox::Column::Processed.eq(false));
        if let Some(max) = max_attempts {
            query = query.filter(profile_sync_outbox::Column::Attempts.lt(max));
        }
        let models = query
            .order_by_asc(profile_sync_outbox::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .context("fetch pending profile sync intents")?;
        Ok(models
            .into_iter()
            .map(|m| ProfileSyncIntent {
                event_id: m.event_id,
                user_id: m.user_id,
                attempts: m.attempts,
                created_at: m.created_at,
            })
            .collect())
    }

    async fn load_profile(&self, user_id: i64) -> Result<Option<Profile>, SocialServiceError> {
        let model = profiles::Entity::find_by_id(user_id)
            .one(self.db.as_ref())
            .await
            .context("load profile snapshot")?;
        model.map(profile_from_model).transpose()
    }

    async fn complete_profile_sync(
        &self,
        intent: &ProfileSyncIntent,
        synced_at: DateTime<Utc>,
    ) -> Result<(), SocialServiceError> {
        let intent = intent.clone();
        self.db
            .transaction::<_, (), TxError>(|txn| {
                Box::pin(async move {
                    profile_sync_outbox::Entity::update_many()
                        .col_expr(profile_sync_outbox::Column::Processed, Expr::value(true))
                        .filter(profile_sync_outbox::Column::EventId.eq(intent.event_id))
                        .exec(txn)
                        .await?;
                    profiles::Entity::update_many()
                        .col_expr(
                            profiles::Column::MatchSyncedAt,
                            Expr::value(Some(synced_at)),
                        )
                        .filter(profiles::Column::UserId.eq(intent.user_id))
                        .exec(txn)
                        .await?;
                    Ok(())
                })
            })
            .await
            .map_err(|e| map_tx_error(e, "complete profile sync intent"))
    }

    async fn discard_profile_sync(&self, event_id: Uuid) -> Result<(), SocialServiceError> {
        profile_sync_outbox::Entity::update_many()
            .col_expr(profile_sync_outbox::Column::Processed, Expr::value(true))
            .filter(profile_sync_outbox::Column::EventId.eq(event_id))
            .exec(self.db.as_ref())
            .await
            .context("discard profile sync intent")?;
        Ok(())
    }

    async fn fetch_pending_lifecycle(
        &self,
        limit: u64,
        max_attempts: Option<i32>,
    ) -> Result<Vec<LifecycleIntent>, SocialServiceError> {
        let mut query = user_lifecycle_outbox::Entity::find()
            .filter(user_lifecycle_outbox::Column::Processed.eq(false));
        if let Some(max) = max_attempts {
            query = query.filter(user_lifecycle_outbox::Column::Attempts.lt(max));
        }
        let models = query
            .order_by_asc(user_lifecycle_outbox::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .context("fetch pending lifecycle intents")?;
        models.into_iter().map(lifecycle_from_model).collect()
    }

    async fn complete_lifecycle(
        &self,
        event_id: Uuid,
        processed_at: DateTime<Utc>,
    ) -> Result<(), SocialServiceError> {
        user_lifecycle_outbox::Entity::update_many()
            .col_expr(user_lifecycle_outbox::Column::Processed, Expr::value(true))
            .col_expr(
                user_lifecycle_outbox::Column::ProcessedAt,
                Expr::value(Some(processed_at)),
            )
            .filter(user_lifecycle_outbox::Column::EventId.eq(event_id))
            .exec(self.db.as_ref())
            .await
            .context("complete lifecycle intent")?;
        Ok(())
    }

    async fn record_failure(
        &self,
        kind: OutboxKind,
        event_id: Uuid,
        error: &str,
    ) -> Result<(), SocialServiceError> {
        let error = error.to_owned();
        let result = match kind {
            OutboxKind::Conversation => {
                conversation_outbox::Entity::update_many()
                    .col_expr(
                        conversation_outbox::Column::Attempts,
                        Expr::col(conversation_outbox::Column::Attempts).add(1),
                    )
                    .col_expr(conversation_outbox::Column::LastError, Expr::value(error))
                    .filter(conversation_outbox::Column::EventId.eq(event_id))
                    .exec(self.db.as_ref())
                    .await
            }
            OutboxKind::ProfileSync => {
                profile_sync_outbox::Entity::update_many()
                    .col_expr(
                        profile_sync_outbox::Column::Attempts,
                        Expr::col(profile_sync_outbox::Column::Attempts).add(1),
                    )
                    .col_expr(profile_sync_outbox::Column::LastError, Expr::value(error))
                    .filter(profile_sync_outbox::Column::EventId.eq(event_id))
                    .exec(self.db.as_ref())
                    .await
            }
            OutboxKind::Lifecycle => {
                user_lifecycle_outbox::Entity::update_many()
                    .col_expr(
                        user_lifecycle_outbox::Column::Attempts,
                        Expr::col(user_lifecycle_outbox::Column::Attempts).add(1),
                    )
                    .col_expr(user_lifecycle_outbox::Column::LastError, Expr::value(error))
                    .filter(user_lifecycle_outbox::Column::EventId.eq(event_id))
                    .exec(self.db.as_ref())
                    .await
            }
        };
        result.with_context(|| format!("record {} delivery failure", kind.as_str()))?;
        Ok(())
    }
}

fn lifecycle_from_model(
    model: user_lifecycle_outbox::Model,
) -> Result<LifecycleIntent, SocialServiceError> {
    let event_type = model
        .event_type
        .parse::<LifecycleEventType>()
        .context("decode lifecycle event type")?;
    Ok(LifecycleIntent {
        event_id: model.event_id,
        user_id: model.user_id,
        event_type,
        payload: model.payload,
        attempts: model.attempts,
        created_at: model.created_at,
    })
}
