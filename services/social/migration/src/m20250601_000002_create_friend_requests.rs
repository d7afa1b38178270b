use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FriendRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FriendRequests::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(FriendRequests::SenderId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FriendRequests::ReceiverId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FriendRequests::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(FriendRequests::ConversationId).uuid())
                    .col(
                        ColumnDef::new(FriendRequests::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FriendRequests::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(FriendRequests::Table, FriendRequests::SenderId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(FriendRequests::Table, FriendRequests::ReceiverId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One request per ordered (sender, receiver) pair; also serves conversation linking.
        manager
            .create_index(
                Index::create()
                    .table(FriendRequests::Table)
                    .col(FriendRequests::SenderId)
                    .col(FriendRequests::ReceiverId)
                    .unique()
                    .name("uq_friend_requests_sender_receiver")
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(FriendRequests::Table)
                    .col(FriendRequests::ReceiverId)
                    .col(FriendRequests::Status)
                    .name("idx_friend_requests_receiver_status")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FriendRequests::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum FriendRequests {
    Table,
    Id,
    SenderId,
    ReceiverId,
    Status,
    ConversationId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
