// Spot allocation
pub mod allocator;
pub mod zones;

// Ancillary operations
pub mod doors;
pub mod places;
pub mod users;

pub use allocator::{SpotAllocator, SpotAssignment, SpotRelease};
pub use doors::DoorService;
pub use places::PlaceService;
pub use users::{UserService, UserWithVehicle};
