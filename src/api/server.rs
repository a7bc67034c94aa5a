//! API server setup

use std::net::SocketAddr;

use anyhow::Context;
use axum::Router;
use log::info;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};

use crate::api::routes::create_router;
use crate::api::state::AppState;
use crate::config::ServerSettings;

/// Build the router and resolve the listen address.
pub fn create_server(
    settings: &ServerSettings,
    state: AppState,
) -> anyhow::Result<(Router, SocketAddr)> {
    let mut router = create_router(state);

    if settings.enable_cors {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    let addr: SocketAddr = format!("{}:{}", settings.host, settings.port)
        .parse()
        .with_context(|| {
            format!(
                "Invalid listen address {}:{}",
                settings.host, settings.port
            )
        })?;

    Ok((router, addr))
}

/// Serve until `shutdown` is cancelled, then drain in-flight requests.
pub async fn run_server(
    settings: &ServerSettings,
    state: AppState,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let (router, addr) = create_server(settings, state)?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("API server listening on {}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .context("API server failed")?;

    info!("API server stopped");
    Ok(())
}
