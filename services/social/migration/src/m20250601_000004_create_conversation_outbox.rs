use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ConversationOutbox::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ConversationOutbox::EventId)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ConversationOutbox::User1Id)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ConversationOutbox::User2Id)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ConversationOutbox::ConversationId).uuid())
                    .col(
                        ColumnDef::new(ConversationOutbox::Processed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(ConversationOutbox::Attempts)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(ConversationOutbox::LastError).text())
                    .col(
                        ColumnDef::new(ConversationOutbox::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Worker poll: pending rows, oldest first.
        manager
            .create_index(
                Index::create()
                    .table(ConversationOutbox::Table)
                    .col(ConversationOutbox::Processed)
                    .col(ConversationOutbox::CreatedAt)
                    .name("idx_conversation_outbox_pending")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ConversationOutbox::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ConversationOutbox {
    Table,
    EventId,
    User1Id,
    User2Id,
    ConversationId,
    Processed,
    Attempts,
    LastError,
    CreatedAt,
}
