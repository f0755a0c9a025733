//! Create dislikes table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Dislikes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Dislikes::Id).string_len(64).not_null().primary_key())
                    .col(ColumnDef::new(Dislikes::UserId).string_len(64).not_null())
                    .col(ColumnDef::new(Dislikes::PostId).string_len(64).not_null())
                    .col(
                        ColumnDef::new(Dislikes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_dislikes_user")
                            .from(Dislikes::Table, Dislikes::UserId)
                            .to(Profiles::Table, Profiles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_dislikes_post")
                            .from(Dislikes::Table, Dislikes::PostId)
                            .to(Posts::Table, Posts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (user_id, post_id) - one dislike per user per post
        manager
            .create_index(
                Index::create()
                    .name("idx_dislikes_user_post")
                    .table(Dislikes::Table)
                    .col(Dislikes::UserId)
                    .col(Dislikes::PostId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: post_id (for counting per post)
        manager
            .create_index(
                Index::create()
                    .name("idx_dislikes_post_id")
                    .table(Dislikes::Table)
                    .col(Dislikes::PostId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Dislikes::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Dislikes {
    Table,
    Id,
    UserId,
    PostId,
    CreatedAt,
}

#[derive(Iden)]
enum Profiles {
    Table,
    Id,
}

#[derive(Iden)]
enum Posts {
    Table,
    Id,
}
