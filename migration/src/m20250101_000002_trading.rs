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
                    .table(Trades::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Trades::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Trades::ProposerId).uuid().not_null())
                    .col(ColumnDef::new(Trades::ReceiverId).uuid().not_null())
                    .col(ColumnDef::new(Trades::OfferSpace).integer().not_null().default(0))
                    .col(ColumnDef::new(Trades::RequestSpace).integer().not_null().default(0))
                    .col(ColumnDef::new(Trades::Status).string_len(20).not_null())
                    .col(ColumnDef::new(Trades::Message).string().not_null().default(""))
                    .col(ColumnDef::new(Trades::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Trades::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_trades_proposer_id")
                            .from(Trades::Table, Trades::ProposerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_trades_receiver_id")
                            .from(Trades::Table, Trades::ReceiverId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One row per asset moved by a trade
        manager
            .create_table(
                Table::create()
                    .table(TradeItems::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(TradeItems::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(TradeItems::TradeId).uuid().not_null())
                    .col(ColumnDef::new(TradeItems::Side).string_len(10).not_null())
                    .col(ColumnDef::new(TradeItems::AssetKind).string_len(10).not_null())
                    .col(ColumnDef::new(TradeItems::AssetId).integer().not_null())
                    .col(ColumnDef::new(TradeItems::Position).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_trade_items_trade_id")
                            .from(TradeItems::Table, TradeItems::TradeId)
                            .to(Trades::Table, Trades::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_trade_items_asset")
                    .table(TradeItems::Table)
                    .col(TradeItems::TradeId)
                    .col(TradeItems::Side)
                    .col(TradeItems::AssetKind)
                    .col(TradeItems::AssetId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TradeLogs::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(TradeLogs::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(TradeLogs::TradeId).uuid().not_null())
                    .col(ColumnDef::new(TradeLogs::Action).string_len(20).not_null())
                    .col(ColumnDef::new(TradeLogs::PerformedBy).uuid().not_null())
                    .col(ColumnDef::new(TradeLogs::Details).string().not_null().default(""))
                    .col(ColumnDef::new(TradeLogs::CreatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_trade_logs_trade_id")
                            .from(TradeLogs::Table, TradeLogs::TradeId)
                            .to(Trades::Table, Trades::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TradeLogs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TradeItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Trades::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Trades {
    Table,
    Id,
    ProposerId,
    ReceiverId,
    OfferSpace,
    RequestSpace,
    Status,
    Message,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum TradeItems {
    Table,
    Id,
    TradeId,
    Side,
    AssetKind,
    AssetId,
    Position,
}

#[derive(DeriveIden)]
enum TradeLogs {
    Table,
    Id,
    TradeId,
    Action,
    PerformedBy,
    Details,
    CreatedAt,
}
