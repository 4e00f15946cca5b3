pub mod door;
pub mod place;
pub mod user;
pub mod user_vehicle;
pub mod vehicle;
