use sea_orm::entity::prelude::*;

/// Profile snapshot pushed to the matching service.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "profiles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: i64,
    pub bio: String,
    pub gender: String,
    pub date_of_birth: Option<String>,
    /// JSON array of strings.
    pub interests: Json,
    /// JSON array of strings.
    pub languages: Json,
    pub country_code: String,
    pub city: String,
    /// Last successful push to the matching service; `None` until the first one.
    pub match_synced_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
