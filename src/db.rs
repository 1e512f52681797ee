pub mod error;
pub mod models;
pub mod pool;
pub mod region_repository;
pub mod schema;
pub mod stat_repository;

pub use error::DbError;
pub use models::*;
pub use pool::connect_pool;
pub use region_repository::RegionRepository;
pub use stat_repository::{StatRepository, StoredCell};
