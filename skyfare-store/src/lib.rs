pub mod app_config;
pub mod database;
pub mod error;
pub mod flight_repo;
pub mod reservation_repo;
pub mod retry;
pub mod user_repo;

pub use app_config::{Config, DatabaseConfig};
pub use database::DbClient;
pub use error::StoreError;
pub use flight_repo::FlightRepository;
pub use reservation_repo::ReservationRepository;
pub use retry::{serializable, RetryPolicy, TxMode};
pub use user_repo::UserRepository;
