use sea_orm::entity::prelude::*;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "clubs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub external_id: i32,
    pub name: String,
    pub description: String,
    pub base_price: i32,
    pub league: Option<String>,
    pub tags: ClubTags,
    pub owner_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(transparent)]
pub struct ClubTags(pub Vec<String>);

impl ClubTags {
    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|t| t == tag)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::club_policies::Entity")]
    ClubPolicies,
}

impl Related<super::club_policies::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClubPolicies.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
