use crate::{
    db::{DatabaseAccess, DbPool},
    entities::place,
    errors::ServiceError,
};
use sea_orm::{EntityTrait, QueryOrder};
use std::sync::Arc;
use tracing::instrument;

#[derive(Clone)]
pub struct PlaceService {
    db: DatabaseAccess,
}

impl PlaceService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self {
            db: DatabaseAccess::new(db_pool),
        }
    }

    /// Every place ordered by id.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<place::Model>, ServiceError> {
        self.db
            .execute("list_places", |db| {
                Box::pin(
                    place::Entity::find()
                        .order_by_asc(place::Column::PlaceId)
                        .all(db),
                )
            })
            .await
    }
}
