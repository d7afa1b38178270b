use sea_orm_migration::prelude::*;

mod m20250601_000001_create_users;
mod m20250601_000002_create_friend_requests;
mod m20250601_000003_create_profiles;
mod m20250601_000004_create_conversation_outbox;
mod m20250601_000005_create_profile_sync_outbox;
mod m20250601_000006_create_user_lifecycle_outbox;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_000001_create_users::Migration),
            Box::new(m20250601_000002_create_friend_requests::Migration),
            Box::new(m20250601_000003_create_profiles::Migration),
            Box::new(m20250601_000004_create_conversation_outbox::Migration),
            Box::new(m20250601_000005_create_profile_sync_outbox::Migration),
            Box::new(m20250601_000006_create_user_lifecycle_outbox::Migration),
        ]
    }
}
