use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// `taken` value of a free place. The column is inverted: 1 means free.
pub const TAKEN_FREE: bool = true;
/// `taken` value of an occupied place.
pub const TAKEN_OCCUPIED: bool = false;

/// A parking spot inside a zone.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "Places")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub place_id: i32,
    pub zone: String,
    /// Whether the place takes part in allocation at all
    pub status: bool,
    /// Inverted occupancy flag, see [`TAKEN_FREE`]
    pub taken: bool,
    pub user_id: Option<i32>,
}

impl Model {
    pub fn is_free(&self) -> bool {
        self.taken == TAKEN_FREE
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "SetNull"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
