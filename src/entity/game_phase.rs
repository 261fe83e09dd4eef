use sea_orm::entity::prelude::*;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};

/// Season-wide state. Exactly one row exists; it is read and written only
/// through `season::phase`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "game_phase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    #[serde(skip)]
    pub id: i32,
    pub current_phase: Phase,
    pub round_number: i32,
    pub draft_round: i32,
    pub draft_order: DraftOrder,
    pub version: i32,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[sea_orm(string_value = "signup")]
    Signup,
    #[sea_orm(string_value = "draw")]
    Draw,
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "trading")]
    Trading,
    #[sea_orm(string_value = "policy")]
    Policy,
    #[sea_orm(string_value = "auction")]
    Auction,
    #[sea_orm(string_value = "match")]
    Match,
    #[sea_orm(string_value = "finished")]
    Finished,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Signup => "signup",
            Phase::Draw => "draw",
            Phase::Draft => "draft",
            Phase::Trading => "trading",
            Phase::Policy => "policy",
            Phase::Auction => "auction",
            Phase::Match => "match",
            Phase::Finished => "finished",
        }
    }

    /// Trades can be proposed while drafting and during the trading window
    pub fn allows_trade_proposals(&self) -> bool {
        matches!(self, Phase::Trading | Phase::Draft)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(transparent)]
pub struct DraftOrder(pub Vec<Uuid>);

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
