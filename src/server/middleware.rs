//! Per-request access logging.

use std::net::SocketAddr;
use std::time::Instant;

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

/// Log remote address, method, url, status and duration of every request.
pub async fn log_request(request: Request<Body>, next: Next) -> Response {
    let remote_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.to_string())
        .unwrap_or_else(|| "-".to_string());
    let method = request.method().clone();
    let url = request.uri().to_string();

    let started = Instant::now();
    let response = next.run(request).await;

    tracing::info!(
        %remote_addr,
        %method,
        %url,
        status = response.status().as_u16(),
        duration_ms = started.elapsed().as_secs_f64() * 1000.0,
        "request"
    );
    response
}
