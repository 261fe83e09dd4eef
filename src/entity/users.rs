use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub nickname: String,
    pub is_admin: bool,
    pub is_registered: bool,
    pub space: i32,
    pub used_space: i32,
    pub club_id: Option<i32>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

impl Model {
    /// Budget still free to spend
    pub fn remaining_space(&self) -> i32 {
        self.space - self.used_space
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::generals::Entity")]
    Generals,
    #[sea_orm(has_many = "super::treasures::Entity")]
    Treasures,
}

impl Related<super::generals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Generals.def()
    }
}

impl Related<super::treasures::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Treasures.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
