//! HTTP surface: `GET /data` plus static files from the public directory.

mod handlers;
mod middleware;

pub use handlers::{handle_data, ApiError, AppState, DataSource, RangeParams};
pub use middleware::log_request;

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;

/// Upper bound on a single request, including slow query-mode statements.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Build the application router.
///
/// No front end ships with the binary: every path other than `/data` is
/// looked up in `public_dir`, and answers 404 when that directory is absent.
pub fn router(state: AppState, public_dir: impl AsRef<Path>) -> Router {
    let public_dir = public_dir.as_ref();
    if !public_dir.is_dir() {
        tracing::warn!(
            public_dir = %public_dir.display(),
            "public directory not found, only /data will be served"
        );
    }
    Router::new()
        .route("/data", get(handle_data))
        .fallback_service(ServeDir::new(public_dir))
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(CompressionLayer::new().gzip(true))
        .layer(axum::middleware::from_fn(log_request))
        .with_state(state)
}

/// Serve `app` on `listener` until `cancel` fires, then drain in-flight
/// requests.
pub async fn serve(
    listener: TcpListener,
    app: Router,
    cancel: CancellationToken,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "listening");
    }

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move { cancel.cancelled().await })
    .await?;

    tracing::info!("server shut down gracefully");
    Ok(())
}
