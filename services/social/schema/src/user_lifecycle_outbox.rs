use sea_orm::entity::prelude::*;

/// Pending account lifecycle event for broker subscribers.
///
/// No foreign key to `users`: a `deleted` row must outlive the account it describes.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "user_lifecycle_outbox")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub event_id: Uuid,
    pub user_id: i64,
    /// `deactivated`, `reactivated` or `deleted`.
    pub event_type: String,
    pub payload: Json,
    pub processed: bool,
    pub processed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub attempts: i32,
    pub last_error: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
