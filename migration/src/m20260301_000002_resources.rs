//! resources 表
//!
//! Shared static assets keyed by content-address. Rows are overwritten in
//! place when a later capture produces the same address.

use sea_orm_migration::prelude::*;

use crate::columns::payload;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();

        manager
            .create_table(
                Table::create()
                    .table(Resources::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Resources::Address)
                            .string_len(128)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Resources::ResourceType)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(payload(backend, Resources::Content))
                    .col(
                        ColumnDef::new(Resources::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Resources::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Resources {
    Table,
    Address,
    ResourceType,
    Content,
    UpdatedAt,
}
