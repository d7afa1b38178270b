use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ProfileSyncOutbox::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProfileSyncOutbox::EventId)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ProfileSyncOutbox::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ProfileSyncOutbox::Processed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(ProfileSyncOutbox::Attempts)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(ProfileSyncOutbox::LastError).text())
                    .col(
                        ColumnDef::new(ProfileSyncOutbox::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(ProfileSyncOutbox::Table)
                    .col(ProfileSyncOutbox::Processed)
                    .col(ProfileSyncOutbox::CreatedAt)
                    .name("idx_profile_sync_outbox_pending")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ProfileSyncOutbox::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ProfileSyncOutbox {
    Table,
    EventId,
    UserId,
    Processed,
    Attempts,
    LastError,
    CreatedAt,
}
