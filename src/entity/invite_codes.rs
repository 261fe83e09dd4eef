use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "invite_codes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub code: String,
    pub kind: InviteKind,
    pub max_uses: i32,
    pub used_count: i32,
    pub expires_at: Option<DateTimeWithTimeZone>,
    pub created_by: Uuid,
    pub remark: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

impl Model {
    pub fn is_expired(&self, now: DateTimeWithTimeZone) -> bool {
        self.expires_at.is_some_and(|at| now > at)
    }

    pub fn is_exhausted(&self) -> bool {
        self.used_count >= self.max_uses
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum InviteKind {
    #[sea_orm(string_value = "single_use")]
    SingleUse,
    #[sea_orm(string_value = "multi_use")]
    MultiUse,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::invite_code_usages::Entity")]
    Usages,
}

impl Related<super::invite_code_usages::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Usages.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
