use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Selection-phase state. Exactly one row exists; it is read and written
/// only through `policy::orchestration`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "policy_phase_config")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    #[serde(skip)]
    pub id: i32,
    pub status: PolicyStatus,
    pub start_time: Option<DateTimeWithTimeZone>,
    pub timeout_minutes: i32,
    pub current_selector: Option<Uuid>,
    pub current_deadline: Option<DateTimeWithTimeZone>,
    pub version: i32,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum PolicyStatus {
    #[sea_orm(string_value = "bidding")]
    Bidding,
    #[sea_orm(string_value = "closed")]
    Closed,
    #[sea_orm(string_value = "selecting")]
    Selecting,
    #[sea_orm(string_value = "completed")]
    Completed,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
