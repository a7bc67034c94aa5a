//! HTTP API over the production store.

pub mod dto;
pub mod error;
pub mod extract;
pub mod handlers;
mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use server::{create_server, run_server};
pub use state::AppState;
