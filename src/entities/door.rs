use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Control record polled by the physical door actuator.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "Door")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub door_id: i32,
    pub requested: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
