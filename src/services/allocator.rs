//! Parking spot allocation across zones.
//!
//! A user is placed in the zone of their current building when it has a free
//! spot, otherwise in the first configured fallback zone that does. Spots are
//! claimed with a conditional update so two concurrent requests can never
//! both win the same place.

use crate::{
    db::{self, DatabaseAccess, DbPool},
    entities::{place, user},
    errors::ServiceError,
    services::zones::ZoneMap,
};
use metrics::counter;
use sea_orm::{
    sea_query::{Expr, LockBehavior, LockType},
    ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Select,
    SqlErr,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Spot granted to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpotAssignment {
    pub place_id: i32,
    /// Zone the spot belongs to, as stored in `Places.zone`
    pub zone: String,
    /// Short zone code returned to clients
    pub zone_code: String,
    /// False when the user already held this spot before the call
    pub newly_assigned: bool,
}

/// Spot returned to the pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpotRelease {
    pub place_id: i32,
}

#[derive(Clone)]
pub struct SpotAllocator {
    db: DatabaseAccess,
    zones: Arc<ZoneMap>,
    max_attempts: u32,
}

impl SpotAllocator {
    pub fn new(db_pool: Arc<DbPool>, zones: ZoneMap, max_attempts: u32) -> Self {
        Self {
            db: DatabaseAccess::new(db_pool),
            zones: Arc::new(zones),
            max_attempts: max_attempts.max(1),
        }
    }

    /// Assigns a free spot to the user identified by `tuition`.
    ///
    /// Users that already hold a spot get it back unchanged.
    #[instrument(skip(self))]
    pub async fn assign(&self, tuition: &str) -> Result<SpotAssignment, ServiceError> {
        let tuition = tuition.to_string();
        let zones = self.zones.clone();
        let max_attempts = self.max_attempts;

        let (place, newly_assigned) = self
            .db
            .transaction::<_, (place::Model, bool), ServiceError>(move |txn| {
                Box::pin(async move {
                    reserve_places(txn).await?;
                    let user = find_user(txn, &tuition).await?;

                    if let Some(existing) = find_assigned_place(txn, user.id).await? {
                        debug!(place_id = existing.place_id, "User already holds a place");
                        return Ok((existing, false));
                    }

                    let search_order = zones.search_order(&user.building);
                    let place =
                        claim_first_free(txn, &search_order, user.id, max_attempts).await?;
                    Ok((place, true))
                })
            })
            .await?;

        if newly_assigned {
            counter!("estaciona_allocator.assigned", 1, "zone" => place.zone.clone());
            info!(place_id = place.place_id, zone = %place.zone, "Place assigned");
        }

        Ok(SpotAssignment {
            zone_code: self.zones.code_for(&place.zone),
            place_id: place.place_id,
            zone: place.zone,
            newly_assigned,
        })
    }

    /// Frees the spot held by the user identified by `tuition`.
    #[instrument(skip(self))]
    pub async fn release(&self, tuition: &str) -> Result<SpotRelease, ServiceError> {
        let tuition = tuition.to_string();

        let released = self
            .db
            .transaction::<_, SpotRelease, ServiceError>(move |txn| {
                Box::pin(async move {
                    reserve_places(txn).await?;
                    let user = find_user(txn, &tuition).await?;
                    let place = find_assigned_place(txn, user.id).await?.ok_or_else(|| {
                        ServiceError::NotFound("No se encontró un lugar asignado".to_string())
                    })?;

                    let result = place::Entity::update_many()
                        .col_expr(place::Column::Taken, Expr::value(place::TAKEN_FREE))
                        .col_expr(place::Column::UserId, Expr::value(Option::<i32>::None))
                        .filter(place::Column::PlaceId.eq(place.place_id))
                        .filter(place::Column::UserId.eq(user.id))
                        .exec(txn)
                        .await?;

                    if result.rows_affected == 0 {
                        return Err(ServiceError::NotFound(
                            "No se encontró un lugar asignado".to_string(),
                        ));
                    }

                    Ok(SpotRelease {
                        place_id: place.place_id,
                    })
                })
            })
            .await?;

        counter!("estaciona_allocator.released", 1);
        info!(place_id = released.place_id, "Place released");
        Ok(released)
    }
}

async fn reserve_places<C: ConnectionTrait>(conn: &C) -> Result<(), ServiceError> {
    Ok(db::reserve_writer(conn, "Places", "taken").await?)
}

async fn find_user<C: ConnectionTrait>(conn: &C, tuition: &str) -> Result<user::Model, ServiceError> {
    user::Entity::find()
        .filter(user::Column::Tuition.eq(tuition))
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Usuario no encontrado".to_string()))
}

async fn find_assigned_place<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
) -> Result<Option<place::Model>, ServiceError> {
    Ok(place::Entity::find()
        .filter(place::Column::UserId.eq(user_id))
        .one(conn)
        .await?)
}

/// Lowest-numbered free and enabled place in `zone`.
///
/// Locking read: rows held by other open claims are skipped and the result
/// reflects the latest committed data rather than the transaction snapshot.
fn first_free_in_zone_query(zone: &str) -> Select<place::Entity> {
    place::Entity::find()
        .filter(place::Column::Zone.eq(zone))
        .filter(place::Column::Status.eq(true))
        .filter(place::Column::Taken.eq(place::TAKEN_FREE))
        .order_by_asc(place::Column::PlaceId)
        .lock_with_behavior(LockType::Update, LockBehavior::SkipLocked)
}

async fn first_free_in_zone<C: ConnectionTrait>(
    conn: &C,
    zone: &str,
) -> Result<Option<place::Model>, ServiceError> {
    Ok(first_free_in_zone_query(zone).one(conn).await?)
}

/// Marks `place_id` occupied by `user_id` if it is still free and enabled.
///
/// Returns `false` when another writer got there first.
pub(crate) async fn try_claim<C: ConnectionTrait>(
    conn: &C,
    place_id: i32,
    user_id: i32,
) -> Result<bool, ServiceError> {
    let result = place::Entity::update_many()
        .col_expr(place::Column::Taken, Expr::value(place::TAKEN_OCCUPIED))
        .col_expr(place::Column::UserId, Expr::value(user_id))
        .filter(place::Column::PlaceId.eq(place_id))
        .filter(place::Column::Taken.eq(place::TAKEN_FREE))
        .filter(place::Column::Status.eq(true))
        .exec(conn)
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                ServiceError::Conflict(format!("User {} already holds a place", user_id))
            }
            _ => ServiceError::db_error(e),
        })?;

    Ok(result.rows_affected == 1)
}

async fn claim_first_free<C: ConnectionTrait>(
    conn: &C,
    search_order: &[String],
    user_id: i32,
    max_attempts: u32,
) -> Result<place::Model, ServiceError> {
    let mut attempts = 0;

    for zone in search_order {
        while let Some(candidate) = first_free_in_zone(conn, zone).await? {
            if attempts >= max_attempts {
                warn!(user_id, attempts, "Gave up claiming a place under contention");
                counter!("estaciona_allocator.contention_exhausted", 1);
                return Err(ServiceError::Conflict(
                    "Too many concurrent assignments, retry later".to_string(),
                ));
            }
            attempts += 1;

            if try_claim(conn, candidate.place_id, user_id).await? {
                return Ok(place::Model {
                    taken: place::TAKEN_OCCUPIED,
                    user_id: Some(user_id),
                    ..candidate
                });
            }
            debug!(place_id = candidate.place_id, zone = %zone, "Place claimed concurrently, retrying");
        }
        debug!(zone = %zone, "No free place in zone");
    }

    counter!("estaciona_allocator.exhausted", 1);
    Err(ServiceError::NoSpotsAvailable(
        "No hay lugares disponibles".to_string(),
    ))
}
