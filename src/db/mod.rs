pub mod models;
pub mod postgres;
mod store;

pub use postgres::PostgresClient;
pub use store::{ProductionFilter, ProductionStore};
