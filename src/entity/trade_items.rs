use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "trade_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub trade_id: Uuid,
    pub side: TradeSide,
    pub asset_kind: AssetKind,
    pub asset_id: i32,
    pub position: i32,
}

/// Offer items move proposer -> receiver, request items move receiver -> proposer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "snake_case")]
pub enum TradeSide {
    #[sea_orm(string_value = "offer")]
    Offer,
    #[sea_orm(string_value = "request")]
    Request,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    #[sea_orm(string_value = "general")]
    General,
    #[sea_orm(string_value = "treasure")]
    Treasure,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::trades::Entity",
        from = "Column::TradeId",
        to = "super::trades::Column::Id"
    )]
    Trade,
}

impl Related<super::trades::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Trade.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
