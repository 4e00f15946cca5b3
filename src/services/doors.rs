use crate::{
    db::{DatabaseAccess, DbPool},
    entities::door,
    errors::ServiceError,
};
use sea_orm::{sea_query::Expr, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use std::sync::Arc;
use tracing::{info, instrument};

/// Door requests consumed by the external door controller.
#[derive(Clone)]
pub struct DoorService {
    db: DatabaseAccess,
    entry_door_id: i32,
}

impl DoorService {
    pub fn new(db_pool: Arc<DbPool>, entry_door_id: i32) -> Self {
        Self {
            db: DatabaseAccess::new(db_pool),
            entry_door_id,
        }
    }

    #[instrument(skip(self), fields(door_id = self.entry_door_id))]
    pub async fn request_entry(&self) -> Result<(), ServiceError> {
        let door_id = self.entry_door_id;
        self.db
            .transaction::<_, (), ServiceError>(move |txn| {
                Box::pin(async move { raise_request(txn, door_id).await })
            })
            .await?;
        info!("Entry requested");
        Ok(())
    }
}

/// Sets `requested` on `door_id`; the controller clears it once handled.
pub(crate) async fn raise_request<C: ConnectionTrait>(
    conn: &C,
    door_id: i32,
) -> Result<(), ServiceError> {
    let result = door::Entity::update_many()
        .col_expr(door::Column::Requested, Expr::value(true))
        .filter(door::Column::DoorId.eq(door_id))
        .exec(conn)
        .await?;

    // Some backends report only changed rows, so an already raised flag reads as 0
    if result.rows_affected == 0 && door::Entity::find_by_id(door_id).one(conn).await?.is_none() {
        return Err(ServiceError::NotFound(format!("Door {} not found", door_id)));
    }
    Ok(())
}
