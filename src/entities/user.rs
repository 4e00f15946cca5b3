use sea_orm::entity::prelude::*;

/// A student or staff member, keyed externally by `tuition`.
///
/// `password` is stored in plaintext by the legacy schema; it is never
/// serialized from this model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "Users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(unique)]
    pub tuition: String,
    pub major: String,
    pub access_type: String,
    pub password: String,
    /// Building the user is currently in, or the unknown sentinel
    pub building: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user_vehicle::Entity")]
    UserVehicle,
    #[sea_orm(has_many = "super::place::Entity")]
    Place,
}

impl Related<super::user_vehicle::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserVehicle.def()
    }
}

impl Related<super::place::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Place.def()
    }
}

impl Related<super::vehicle::Entity> for Entity {
    fn to() -> RelationDef {
        super::user_vehicle::Relation::Vehicle.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::user_vehicle::Relation::User.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
