//! Application state for the API server

use std::sync::Arc;

use crate::db::ProductionStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ProductionStore>,
    /// Largest `horizonte` the forecast endpoint accepts.
    pub max_forecast_horizon: usize,
    pub version: String,
}

impl AppState {
    pub fn new(store: Arc<dyn ProductionStore>, max_forecast_horizon: usize) -> Self {
        Self {
            store,
            max_forecast_horizon,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
