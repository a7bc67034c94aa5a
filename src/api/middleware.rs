use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};
use log::{info, warn};

/// One log line per request with status and latency.
pub async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    if status.is_server_error() {
        warn!("{} {} -> {} in {:?}", method, path, status.as_u16(), start.elapsed());
    } else {
        info!("{} {} -> {} in {:?}", method, path, status.as_u16(), start.elapsed());
    }

    response
}
