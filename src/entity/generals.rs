use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "generals")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub external_id: i32,
    pub name: String,
    pub command: i32,
    pub force: i32,
    pub intelligence: i32,
    pub politics: i32,
    pub charm: i32,
    pub affinity: i32,
    pub spear: String,
    pub halberd: String,
    pub crossbow: String,
    pub cavalry: String,
    pub soldier: String,
    pub water: String,
    pub skills: String,
    pub note: String,
    pub pool_type: PoolType,
    pub tier: String,
    pub salary: i32,
    pub owner_id: Option<Uuid>,
    pub is_available: bool,
    pub injured_until: Option<i32>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

/// Which allocation channel a general can be acquired through
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum PoolType {
    #[sea_orm(string_value = "guarantee")]
    Guarantee,
    #[sea_orm(string_value = "normal")]
    Normal,
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "auction")]
    Auction,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::OwnerId",
        to = "super::users::Column::Id"
    )]
    Owner,
    #[sea_orm(has_one = "super::auction_records::Entity")]
    AuctionRecord,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::auction_records::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AuctionRecord.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
