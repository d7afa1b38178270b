use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserLifecycleOutbox::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserLifecycleOutbox::EventId)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(UserLifecycleOutbox::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserLifecycleOutbox::EventType)
                            .string()
                            .not_null()
                            .check(Expr::col(UserLifecycleOutbox::EventType).is_in([
                                "deactivated",
                                "reactivated",
                                "deleted",
                            ])),
                    )
                    .col(
                        ColumnDef::new(UserLifecycleOutbox::Payload)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'{}'::jsonb")),
                    )
                    .col(
                        ColumnDef::new(UserLifecycleOutbox::Processed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(UserLifecycleOutbox::ProcessedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(UserLifecycleOutbox::Attempts)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(UserLifecycleOutbox::LastError).text())
                    .col(
                        ColumnDef::new(UserLifecycleOutbox::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(UserLifecycleOutbox::Table)
                    .col(UserLifecycleOutbox::Processed)
                    .col(UserLifecycleOutbox::CreatedAt)
                    .name("idx_user_lifecycle_outbox_pending")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserLifecycleOutbox::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum UserLifecycleOutbox {
    Table,
    EventId,
    UserId,
    EventType,
    Payload,
    Processed,
    ProcessedAt,
    Attempts,
    LastError,
    CreatedAt,
}
