use crate::{
    db::{self, DatabaseAccess, DbPool},
    entities::{user, user_vehicle, vehicle},
    errors::ServiceError,
};
use sea_orm::{
    sea_query::Expr, ColumnTrait, ConnectionTrait, EntityTrait, FromQueryResult, JoinType,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait,
};
use std::sync::Arc;
use tracing::{info, instrument};

/// A user joined with their (optional) vehicle.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct UserWithVehicle {
    pub id: i32,
    pub name: String,
    pub tuition: String,
    pub major: String,
    pub access_type: String,
    pub password: String,
    pub building: String,
    pub brand: Option<String>,
    pub model: Option<String>,
}

impl UserWithVehicle {
    /// "brand model" built from whichever parts are present; empty when none are.
    pub fn vehicle(&self) -> String {
        [self.brand.as_deref(), self.model.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Clone)]
pub struct UserService {
    db: DatabaseAccess,
    entry_door_id: i32,
    unknown_building: String,
}

impl UserService {
    pub fn new(db_pool: Arc<DbPool>, entry_door_id: i32, unknown_building: String) -> Self {
        Self {
            db: DatabaseAccess::new(db_pool),
            entry_door_id,
            unknown_building,
        }
    }

    /// All users with their vehicle, ordered by id.
    #[instrument(skip(self))]
    pub async fn list_with_vehicles(&self) -> Result<Vec<UserWithVehicle>, ServiceError> {
        self.db
            .execute("list_users_with_vehicles", |db| {
                let query = user::Entity::find()
                    .select_only()
                    .column(user::Column::Id)
                    .column(user::Column::Name)
                    .column(user::Column::Tuition)
                    .column(user::Column::Major)
                    .column(user::Column::AccessType)
                    .column(user::Column::Password)
                    .column(user::Column::Building)
                    .column_as(vehicle::Column::Brand, "brand")
                    .column_as(vehicle::Column::Model, "model")
                    .join(JoinType::LeftJoin, user::Relation::UserVehicle.def())
                    .join(JoinType::LeftJoin, user_vehicle::Relation::Vehicle.def())
                    .order_by_asc(user::Column::Id);
                Box::pin(query.into_model::<UserWithVehicle>().all(db))
            })
            .await
    }

    /// Overwrites the building of the user identified by `tuition`.
    #[instrument(skip(self))]
    pub async fn update_building(&self, tuition: &str, building: &str) -> Result<(), ServiceError> {
        let tuition = tuition.to_string();
        let building = building.to_string();

        self.db
            .transaction::<_, (), ServiceError>(move |txn| {
                Box::pin(async move {
                    db::reserve_writer(txn, "Users", "building").await?;
                    ensure_user_exists(txn, &tuition).await?;
                    set_building(txn, &tuition, &building).await
                })
            })
            .await?;

        info!("Building updated");
        Ok(())
    }

    /// Raises the entry door flag and moves the user to the unknown building.
    #[instrument(skip(self))]
    pub async fn exit_and_reset(&self, tuition: &str) -> Result<(), ServiceError> {
        let tuition = tuition.to_string();
        let door_id = self.entry_door_id;
        let unknown = self.unknown_building.clone();

        self.db
            .transaction::<_, (), ServiceError>(move |txn| {
                Box::pin(async move {
                    db::reserve_writer(txn, "Users", "building").await?;
                    ensure_user_exists(txn, &tuition).await?;
                    super::doors::raise_request(txn, door_id).await?;
                    set_building(txn, &tuition, &unknown).await
                })
            })
            .await?;

        info!(door_id, "Exit registered and building reset");
        Ok(())
    }
}

async fn ensure_user_exists<C: ConnectionTrait>(conn: &C, tuition: &str) -> Result<(), ServiceError> {
    user::Entity::find()
        .filter(user::Column::Tuition.eq(tuition))
        .one(conn)
        .await?
        .map(|_| ())
        .ok_or_else(|| ServiceError::NotFound("Usuario no encontrado".to_string()))
}

async fn set_building<C: ConnectionTrait>(
    conn: &C,
    tuition: &str,
    building: &str,
) -> Result<(), ServiceError> {
    user::Entity::update_many()
        .col_expr(user::Column::Building, Expr::value(building))
        .filter(user::Column::Tuition.eq(tuition))
        .exec(conn)
        .await?;
    Ok(())
}
