pub mod analytics;
pub mod api;
pub mod config;
pub mod cron;
pub mod db;
pub mod etl;

pub use api::{create_router, run_server, AppState};
pub use config::Settings;
pub use cron::{CronScheduler, CronSettings};
pub use db::{PostgresClient, ProductionFilter, ProductionStore};
pub use etl::PriceFeed;
