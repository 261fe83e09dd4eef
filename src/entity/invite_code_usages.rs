use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "invite_code_usages")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub invite_code_id: Uuid,
    pub user_id: Uuid,
    pub used_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::invite_codes::Entity",
        from = "Column::InviteCodeId",
        to = "super::invite_codes::Column::Id"
    )]
    InviteCode,
}

impl Related<super::invite_codes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InviteCode.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
