use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "draw_records")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub general_id: i32,
    pub draw_type: DrawType,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum DrawType {
    #[sea_orm(string_value = "guarantee")]
    Guarantee,
    #[sea_orm(string_value = "normal")]
    Normal,
}

impl DrawType {
    /// The pool a draw of this type is taken from
    pub fn pool(&self) -> super::generals::PoolType {
        match self {
            DrawType::Guarantee => super::generals::PoolType::Guarantee,
            DrawType::Normal => super::generals::PoolType::Normal,
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::generals::Entity",
        from = "Column::GeneralId",
        to = "super::generals::Column::Id"
    )]
    General,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    User,
}

impl Related<super::generals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::General.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
