use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name("idx_user_log_entries_user_id")
                    .table(UserLogEntries::Table)
                    .col(UserLogEntries::UserId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_user_log_entries_event_type_occurred_at")
                    .table(UserLogEntries::Table)
                    .col(UserLogEntries::EventType)
                    .col(UserLogEntries::OccurredAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_authn_identity_tags_user_id")
                    .table(AuthnIdentityTags::Table)
                    .col(AuthnIdentityTags::UserId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_authn_identity_tags_user_id")
                    .table(AuthnIdentityTags::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_user_log_entries_event_type_occurred_at")
                    .table(UserLogEntries::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_user_log_entries_user_id")
                    .table(UserLogEntries::Table)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum UserLogEntries {
    Table,
    UserId,
    EventType,
    OccurredAt,
}

#[derive(DeriveIden)]
enum AuthnIdentityTags {
    Table,
    UserId,
}
