pub mod common;
pub mod doors;
pub mod places;
pub mod users;

use crate::{
    config::AppConfig,
    db::DbPool,
    services::{DoorService, PlaceService, SpotAllocator, UserService},
};
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub allocator: Arc<SpotAllocator>,
    pub users: Arc<UserService>,
    pub doors: Arc<DoorService>,
    pub places: Arc<PlaceService>,
}

impl AppServices {
    /// Wires every service onto the shared pool using the loaded configuration.
    pub fn new(db_pool: Arc<DbPool>, config: &AppConfig) -> Self {
        let allocator = Arc::new(SpotAllocator::new(
            db_pool.clone(),
            config.zone_map(),
            config.allocation_max_attempts,
        ));
        let users = Arc::new(UserService::new(
            db_pool.clone(),
            config.entry_door_id,
            config.unknown_building.clone(),
        ));
        let doors = Arc::new(DoorService::new(db_pool.clone(), config.entry_door_id));
        let places = Arc::new(PlaceService::new(db_pool));

        Self {
            allocator,
            users,
            doors,
            places,
        }
    }
}
