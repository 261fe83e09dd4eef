use sea_orm_migration::prelude::*;

use crate::m20250101_000000_init_schema::{Clubs, Generals, Users};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PolicyBids::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PolicyBids::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(PolicyBids::UserId).uuid().not_null().unique_key())
                    .col(ColumnDef::new(PolicyBids::BidAmount).integer().not_null())
                    .col(ColumnDef::new(PolicyBids::Rank).integer().null())
                    .col(ColumnDef::new(PolicyBids::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(PolicyBids::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_policy_bids_user_id")
                            .from(PolicyBids::Table, PolicyBids::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PolicyPreferences::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PolicyPreferences::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(PolicyPreferences::UserId).uuid().not_null())
                    .col(ColumnDef::new(PolicyPreferences::ClubId).integer().not_null())
                    .col(ColumnDef::new(PolicyPreferences::Priority).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_policy_preferences_user_id")
                            .from(PolicyPreferences::Table, PolicyPreferences::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_policy_preferences_club_id")
                            .from(PolicyPreferences::Table, PolicyPreferences::ClubId)
                            .to(Clubs::Table, Clubs::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_policy_preferences_user_club")
                    .table(PolicyPreferences::Table)
                    .col(PolicyPreferences::UserId)
                    .col(PolicyPreferences::ClubId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PolicySelections::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PolicySelections::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(PolicySelections::UserId).uuid().not_null().unique_key())
                    .col(ColumnDef::new(PolicySelections::ClubId).integer().not_null().unique_key())
                    .col(ColumnDef::new(PolicySelections::BidCost).integer().not_null())
                    .col(ColumnDef::new(PolicySelections::AutoAssigned).boolean().not_null().default(false))
                    .col(ColumnDef::new(PolicySelections::SelectOrder).integer().not_null())
                    .col(ColumnDef::new(PolicySelections::CreatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_policy_selections_user_id")
                            .from(PolicySelections::Table, PolicySelections::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_policy_selections_club_id")
                            .from(PolicySelections::Table, PolicySelections::ClubId)
                            .to(Clubs::Table, Clubs::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Single-row selection state, versioned on every write
        manager
            .create_table(
                Table::create()
                    .table(PolicyPhaseConfig::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PolicyPhaseConfig::Id).integer().not_null().primary_key())
                    .col(ColumnDef::new(PolicyPhaseConfig::Status).string_len(20).not_null())
                    .col(ColumnDef::new(PolicyPhaseConfig::StartTime).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(PolicyPhaseConfig::TimeoutMinutes).integer().not_null().default(10))
                    .col(ColumnDef::new(PolicyPhaseConfig::CurrentSelector).uuid().null())
                    .col(ColumnDef::new(PolicyPhaseConfig::CurrentDeadline).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(PolicyPhaseConfig::Version).integer().not_null().default(0))
                    .col(ColumnDef::new(PolicyPhaseConfig::UpdatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AuctionRecords::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AuctionRecords::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(AuctionRecords::GeneralId).integer().not_null().unique_key())
                    .col(ColumnDef::new(AuctionRecords::UserId).uuid().null())
                    .col(ColumnDef::new(AuctionRecords::Price).integer().not_null().default(0))
                    .col(ColumnDef::new(AuctionRecords::IsUnsold).boolean().not_null().default(false))
                    .col(ColumnDef::new(AuctionRecords::Remark).string().not_null().default(""))
                    .col(ColumnDef::new(AuctionRecords::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(AuctionRecords::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_auction_records_general_id")
                            .from(AuctionRecords::Table, AuctionRecords::GeneralId)
                            .to(Generals::Table, Generals::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_auction_records_user_id")
                            .from(AuctionRecords::Table, AuctionRecords::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AuctionRecords::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PolicyPhaseConfig::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PolicySelections::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PolicyPreferences::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PolicyBids::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum PolicyBids {
    Table,
    Id,
    UserId,
    BidAmount,
    Rank,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum PolicyPreferences {
    Table,
    Id,
    UserId,
    ClubId,
    Priority,
}

#[derive(DeriveIden)]
enum PolicySelections {
    Table,
    Id,
    UserId,
    ClubId,
    BidCost,
    AutoAssigned,
    SelectOrder,
    CreatedAt,
}

#[derive(DeriveIden)]
enum PolicyPhaseConfig {
    Table,
    Id,
    Status,
    StartTime,
    TimeoutMinutes,
    CurrentSelector,
    CurrentDeadline,
    Version,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum AuctionRecords {
    Table,
    Id,
    GeneralId,
    UserId,
    Price,
    IsUnsold,
    Remark,
    CreatedAt,
    UpdatedAt,
}
