//! HTTP route handlers.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Months, NaiveDate, Utc};
use grapher_core::types::{INPUT_REPORT_TITLE, QUERY_REPORT_TITLE};
use grapher_core::{Report, ResultStore};
use grapher_feeds::{QueryError, QueryPath};
use serde::Deserialize;

/// Where `GET /data` reads its series from.
#[derive(Clone)]
pub enum DataSource {
    /// The live series built by the ingestor.
    Input(Arc<ResultStore>),
    /// The configured SQL statement, run per request.
    Query(QueryPath),
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub source: DataSource,
}

/// `start` / `end` query parameters, as `YYYY-MM-DD`.
#[derive(Debug, Default, Deserialize)]
pub struct RangeParams {
    pub start: Option<String>,
    pub end: Option<String>,
}

impl RangeParams {
    /// Resolve the range, defaulting to the month before `now`. Values that
    /// do not parse are ignored.
    pub fn resolve(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = parse_day(self.start.as_deref())
            .unwrap_or_else(|| now.checked_sub_months(Months::new(1)).unwrap_or(now));
        let end = parse_day(self.end.as_deref()).unwrap_or(now);
        (start, end)
    }
}

fn parse_day(value: Option<&str>) -> Option<DateTime<Utc>> {
    let day = NaiveDate::parse_from_str(value?.trim(), "%Y-%m-%d").ok()?;
    Some(day.and_hms_opt(0, 0, 0)?.and_utc())
}

/// Request-scoped failure, rendered as `500` with a plain-text body.
#[derive(Debug)]
pub struct ApiError(String);

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        tracing::warn!(error = %err, "query failed");
        Self(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!(error = %err, "failed to encode response");
        Self(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, self.0).into_response()
    }
}

/// Handle GET /data
pub async fn handle_data(
    State(state): State<AppState>,
    Query(params): Query<RangeParams>,
) -> Result<Response, ApiError> {
    let body = match &state.source {
        DataSource::Input(store) => {
            let snapshot = store.snapshot();
            serde_json::to_vec(&Report {
                title: INPUT_REPORT_TITLE,
                results: snapshot.points(),
            })?
        }
        DataSource::Query(query) => {
            let (start, end) = params.resolve(Utc::now());
            let points = query.points(start, end).await?;
            serde_json::to_vec(&Report {
                title: QUERY_REPORT_TITLE,
                results: &points,
            })?
        }
    };

    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}
