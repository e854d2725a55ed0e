//! Test builders: ergonomic constructors for points, parsers and apps.
//!
//! These builders are designed for readability in test assertions, not for
//! production use. They panic on invalid input rather than returning `Result`.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use grapher::server::{self, AppState, DataSource};
use grapher_core::{Attrs, Granularity, LineParser, ResultStore, Schema, TimeLayout, TimeSeriesPoint};
use grapher_feeds::{QueryPath, SqliteRangeQuery};

use crate::common::fixtures::{SYSLOG_LAYOUT, SYSLOG_PATTERN};

// ---------------------------------------------------------------------------
// PointBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for [`TimeSeriesPoint`] fixtures.
///
/// ```rust
/// let p = PointBuilder::at("2024-01-05T10:00:00Z").value(2).attr("msg", "a").build();
/// ```
pub struct PointBuilder {
    time: DateTime<Utc>,
    value: i64,
    attrs: Attrs,
}

impl PointBuilder {
    pub fn at(rfc3339: &str) -> Self {
        Self {
            time: utc(rfc3339),
            value: 1,
            attrs: Attrs::new(),
        }
    }

    pub fn value(mut self, value: i64) -> Self {
        self.value = value;
        self
    }

    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> TimeSeriesPoint {
        TimeSeriesPoint::new(self.time, self.value).with_attrs(self.attrs)
    }
}

/// Parse an RFC 3339 timestamp, panicking on bad input.
pub fn utc(rfc3339: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(rfc3339)
        .unwrap_or_else(|e| panic!("bad test timestamp {rfc3339:?}: {e}"))
        .with_timezone(&Utc)
}

// ---------------------------------------------------------------------------
// Parsers
// ---------------------------------------------------------------------------

/// Build a parser from raw settings.
pub fn parser(pattern: &str, layout: &str, granularity: &str) -> LineParser {
    LineParser::new(
        Schema::derive(pattern).unwrap(),
        TimeLayout::parse(layout).unwrap(),
        Granularity::parse(granularity).unwrap(),
    )
}

/// Syslog-style parser with one-minute buckets.
pub fn syslog_parser() -> LineParser {
    parser(SYSLOG_PATTERN, SYSLOG_LAYOUT, "1m")
}

// ---------------------------------------------------------------------------
// Apps
// ---------------------------------------------------------------------------

/// Router serving a live store.
pub fn input_app(store: Arc<ResultStore>, public_dir: &Path) -> axum::Router {
    server::router(
        AppState {
            source: DataSource::Input(store),
        },
        public_dir,
    )
}

/// Router running `sql` against the SQLite database at `db`.
pub fn query_app(db: &Path, sql: &str, public_dir: &Path) -> axum::Router {
    let backend = SqliteRangeQuery::open(db.to_str().unwrap()).unwrap();
    server::router(
        AppState {
            source: DataSource::Query(QueryPath::new(Arc::new(backend), sql)),
        },
        public_dir,
    )
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Send one request through `app` and collect the response.
pub async fn send(
    app: axum::Router,
    request: axum::http::Request<axum::body::Body>,
) -> (axum::http::StatusCode, axum::http::HeaderMap, bytes::Bytes) {
    use tower::ServiceExt;

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, body)
}

/// `GET uri` through `app`.
pub async fn get(
    app: axum::Router,
    uri: &str,
) -> (axum::http::StatusCode, axum::http::HeaderMap, bytes::Bytes) {
    let request = axum::http::Request::builder()
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    send(app, request).await
}
