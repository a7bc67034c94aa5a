//! API router

use axum::{middleware, routing::get, Router};

use crate::api::handlers;
use crate::api::middleware::log_requests;
use crate::api::state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::home))
        .route("/health", get(handlers::health))
        // Operator catalogue and per-operator series
        .route("/empresas", get(handlers::list_operators))
        .route("/produccion/:empresa", get(handlers::production))
        .route("/eficiencia/:empresa", get(handlers::efficiency))
        .route("/curvas-tipo/:empresa", get(handlers::type_curve))
        .route("/pronostico/:empresa", get(handlers::forecast))
        .route("/escenario/:empresa", get(handlers::revenue_scenario))
        // Cross-operator views
        .route("/ducs", get(handlers::uncompleted_wells))
        .route("/venteo", get(handlers::flaring))
        .route("/kpis", get(handlers::kpis))
        .route("/ranking", get(handlers::revenue_ranking))
        .fallback(handlers::not_found)
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}
