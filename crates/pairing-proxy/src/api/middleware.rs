//! Request logging middleware.

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Log each request once it completes.
///
/// Client errors (bad method, missing or short numbers) are the caller's
/// problem and stay at debug; server errors are raised to warn.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis() as u64;

    if status.is_server_error() {
        warn!(%method, %path, %status, elapsed_ms, "Request failed");
    } else if status.is_client_error() {
        debug!(%method, %path, %status, elapsed_ms, "Request rejected");
    } else {
        info!(%method, %path, %status, elapsed_ms, "Request completed");
    }

    response
}
