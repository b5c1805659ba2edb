//! users / links 表
//!
//! A user row is created lazily the first time an external identity saves or
//! queries links. Links cascade with their owner.

use sea_orm_migration::prelude::*;

use crate::columns::payload;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();

        // 创建 users 表
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Users::ExternalId)
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建 links 表
        manager
            .create_table(
                Table::create()
                    .table(Links::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Links::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Links::UserId).big_integer().not_null())
                    .col(ColumnDef::new(Links::OriginalUrl).text().not_null())
                    .col(ColumnDef::new(Links::Description).text().not_null())
                    .col(payload(backend, Links::Content))
                    .col(
                        ColumnDef::new(Links::Charset)
                            .string_len(32)
                            .not_null()
                            .default("UTF-8"),
                    )
                    .col(
                        ColumnDef::new(Links::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_links_user_id")
                            .from(Links::Table, Links::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // serving path looks up (user_id, original_url)
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_links_user_url")
                    .table(Links::Table)
                    .col(Links::UserId)
                    .col(Links::OriginalUrl)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_links_user_url").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Links::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    ExternalId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Links {
    Table,
    Id,
    UserId,
    OriginalUrl,
    Description,
    Content,
    Charset,
    CreatedAt,
}
