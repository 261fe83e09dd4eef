use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "draft_records")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub general_id: i32,
    pub round: i32,
    pub pick: i32,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::generals::Entity",
        from = "Column::GeneralId",
        to = "super::generals::Column::Id"
    )]
    General,
}

impl Related<super::generals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::General.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
