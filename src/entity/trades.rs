use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "trades")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub proposer_id: Uuid,
    pub receiver_id: Uuid,
    pub offer_space: i32,
    pub request_space: i32,
    pub status: TradeStatus,
    pub message: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

impl Model {
    pub fn involves(&self, user_id: Uuid) -> bool {
        self.proposer_id == user_id || self.receiver_id == user_id
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum TradeStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "accepted")]
    Accepted,
    #[sea_orm(string_value = "rejected")]
    Rejected,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::trade_items::Entity")]
    TradeItems,
    #[sea_orm(has_many = "super::trade_logs::Entity")]
    TradeLogs,
}

impl Related<super::trade_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TradeItems.def()
    }
}

impl Related<super::trade_logs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TradeLogs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
