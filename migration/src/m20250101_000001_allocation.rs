use sea_orm_migration::prelude::*;

use crate::m20250101_000000_init_schema::{Generals, Users};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DrawRecords::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(DrawRecords::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(DrawRecords::UserId).uuid().not_null())
                    .col(ColumnDef::new(DrawRecords::GeneralId).integer().not_null())
                    .col(ColumnDef::new(DrawRecords::DrawType).string_len(20).not_null())
                    .col(ColumnDef::new(DrawRecords::CreatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_draw_records_user_id")
                            .from(DrawRecords::Table, DrawRecords::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_draw_records_general_id")
                            .from(DrawRecords::Table, DrawRecords::GeneralId)
                            .to(Generals::Table, Generals::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_draw_records_user_type")
                    .table(DrawRecords::Table)
                    .col(DrawRecords::UserId)
                    .col(DrawRecords::DrawType)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DraftRecords::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(DraftRecords::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(DraftRecords::UserId).uuid().not_null())
                    .col(ColumnDef::new(DraftRecords::GeneralId).integer().not_null())
                    .col(ColumnDef::new(DraftRecords::Round).integer().not_null())
                    .col(ColumnDef::new(DraftRecords::Pick).integer().not_null())
                    .col(ColumnDef::new(DraftRecords::CreatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_draft_records_user_id")
                            .from(DraftRecords::Table, DraftRecords::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_draft_records_general_id")
                            .from(DraftRecords::Table, DraftRecords::GeneralId)
                            .to(Generals::Table, Generals::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DraftRecords::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DrawRecords::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum DrawRecords {
    Table,
    Id,
    UserId,
    GeneralId,
    DrawType,
    CreatedAt,
}

#[derive(DeriveIden)]
enum DraftRecords {
    Table,
    Id,
    UserId,
    GeneralId,
    Round,
    Pick,
    CreatedAt,
}
