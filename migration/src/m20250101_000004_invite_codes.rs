use sea_orm_migration::prelude::*;

use crate::m20250101_000000_init_schema::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(InviteCodes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(InviteCodes::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(InviteCodes::Code).string_len(32).not_null().unique_key())
                    .col(ColumnDef::new(InviteCodes::Kind).string_len(20).not_null())
                    .col(ColumnDef::new(InviteCodes::MaxUses).integer().not_null().default(1))
                    .col(ColumnDef::new(InviteCodes::UsedCount).integer().not_null().default(0))
                    .col(ColumnDef::new(InviteCodes::ExpiresAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(InviteCodes::CreatedBy).uuid().not_null())
                    .col(ColumnDef::new(InviteCodes::Remark).string().not_null().default(""))
                    .col(ColumnDef::new(InviteCodes::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(InviteCodes::UpdatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(InviteCodeUsages::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(InviteCodeUsages::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(InviteCodeUsages::InviteCodeId).uuid().not_null())
                    .col(ColumnDef::new(InviteCodeUsages::UserId).uuid().not_null())
                    .col(ColumnDef::new(InviteCodeUsages::UsedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_invite_code_usages_code_id")
                            .from(InviteCodeUsages::Table, InviteCodeUsages::InviteCodeId)
                            .to(InviteCodes::Table, InviteCodes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_invite_code_usages_user_id")
                            .from(InviteCodeUsages::Table, InviteCodeUsages::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(InviteCodeUsages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(InviteCodes::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum InviteCodes {
    Table,
    Id,
    Code,
    Kind,
    MaxUses,
    UsedCount,
    ExpiresAt,
    CreatedBy,
    Remark,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum InviteCodeUsages {
    Table,
    Id,
    InviteCodeId,
    UserId,
    UsedAt,
}
