use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "Vehicles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub vehicle_id: i32,
    pub brand: Option<String>,
    pub model: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user_vehicle::Entity")]
    UserVehicle,
}

impl Related<super::user_vehicle::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserVehicle.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
