use serde::{Deserialize, Serialize};

use crate::entity::generals::PoolType;

/// Catalog rows already parsed from the season spreadsheet
#[derive(Debug, Default, Deserialize)]
pub struct ImportPayload {
    #[serde(default)]
    pub generals: Vec<GeneralRow>,
    #[serde(default)]
    pub treasures: Vec<TreasureRow>,
    #[serde(default)]
    pub clubs: Vec<ClubRow>,
    #[serde(default)]
    pub cities: Vec<CityRow>,
    #[serde(default)]
    pub rules: Vec<RuleRow>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneralRow {
    pub external_id: i32,
    pub name: String,
    #[serde(default)]
    pub command: i32,
    #[serde(default)]
    pub force: i32,
    #[serde(default)]
    pub intelligence: i32,
    #[serde(default)]
    pub politics: i32,
    #[serde(default)]
    pub charm: i32,
    #[serde(default)]
    pub affinity: i32,
    #[serde(default)]
    pub spear: String,
    #[serde(default)]
    pub halberd: String,
    #[serde(default)]
    pub crossbow: String,
    #[serde(default)]
    pub cavalry: String,
    #[serde(default)]
    pub soldier: String,
    #[serde(default)]
    pub water: String,
    #[serde(default)]
    pub skills: String,
    #[serde(default)]
    pub note: String,
    pub pool_type: PoolType,
    #[serde(default)]
    pub tier: String,
    pub salary: i32,
    #[serde(default)]
    pub injured_until: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TreasureRow {
    pub external_id: i32,
    pub name: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub value: i32,
    #[serde(default)]
    pub effect: String,
    #[serde(default)]
    pub skill: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClubRow {
    pub external_id: i32,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub base_price: i32,
    #[serde(default)]
    pub league: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Listed in display order
    #[serde(default)]
    pub policies: Vec<ClubPolicyRow>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClubPolicyRow {
    pub condition: String,
    pub effect: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CityRow {
    pub external_id: i32,
    pub name: String,
    #[serde(default)]
    pub specialty: String,
    #[serde(default)]
    pub max_soldiers: i32,
    #[serde(default)]
    pub gold_income: i32,
    #[serde(default)]
    pub food_income: i32,
    #[serde(default)]
    pub durability: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RuleRow {
    pub category: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub sort_order: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportCount {
    pub inserted: usize,
    pub updated: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub generals: ImportCount,
    pub treasures: ImportCount,
    pub clubs: ImportCount,
    pub cities: ImportCount,
    pub rules: ImportCount,
}
