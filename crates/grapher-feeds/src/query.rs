//! Query path: builds the series from a parameterized SQL range query.
//!
//! A [`RangeQuery`] backend runs the configured statement with the requested
//! `start` and `end` and returns raw rows. [`map_rows`] then enforces the
//! column contract (`time` first, `value` second) and maps rows by column
//! name into [`TimeSeriesPoint`]s. Failures here are request-scoped.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use grapher_core::{Attrs, TimeSeriesPoint};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
    /// The result columns break the `time`, `value` contract.
    #[error("{0}")]
    Schema(String),

    #[error("query error: {0}")]
    Query(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("row {row}: {reason}")]
    Row { row: usize, reason: String },

    #[error("query task failed: {0}")]
    Task(String),
}

/// A dynamically-typed column value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

/// Column names plus rows, in result order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryRows {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

/// A read-only SQL backend able to run one statement over a time range.
///
/// Implementations bind `start` and `end` as the first and second statement
/// parameters.
pub trait RangeQuery: Send + Sync {
    fn fetch(
        &self,
        sql: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<QueryRows, QueryError>;
}

// ---------------------------------------------------------------------------
// Column contract + row mapping
// ---------------------------------------------------------------------------

pub const TIME_COLUMN: &str = "time";
pub const VALUE_COLUMN: &str = "value";
pub const ATTRS_COLUMN: &str = "attrs";

/// Check that the first two columns are `time` and `value`.
pub fn check_columns(columns: &[String]) -> Result<(), QueryError> {
    if columns.first().map(String::as_str) != Some(TIME_COLUMN) {
        return Err(QueryError::Schema(
            "first field returned by query must be 'time'".to_string(),
        ));
    }
    if columns.get(1).map(String::as_str) != Some(VALUE_COLUMN) {
        return Err(QueryError::Schema(
            "second field returned by query must be 'value'".to_string(),
        ));
    }
    Ok(())
}

/// Map rows to points in result order. Columns other than `time`, `value`
/// and `attrs` are ignored.
pub fn map_rows(result: QueryRows) -> Result<Vec<TimeSeriesPoint>, QueryError> {
    check_columns(&result.columns)?;
    let attrs_at = result.columns.iter().position(|c| c == ATTRS_COLUMN);

    result
        .rows
        .into_iter()
        .enumerate()
        .map(|(row, values)| {
            let bad = |reason: String| QueryError::Row { row, reason };

            let time = values
                .first()
                .ok_or_else(|| bad("missing time".to_string()))
                .and_then(|v| time_from(v).map_err(bad))?;
            let value = values
                .get(1)
                .ok_or_else(|| bad("missing value".to_string()))
                .and_then(|v| value_from(v).map_err(bad))?;
            let attrs = match attrs_at.and_then(|i| values.get(i)) {
                Some(v) => attrs_from(v).map_err(bad)?,
                None => Attrs::new(),
            };

            Ok(TimeSeriesPoint::new(time, value).with_attrs(attrs))
        })
        .collect()
}

fn time_from(value: &Value) -> Result<DateTime<Utc>, String> {
    match value {
        Value::Integer(secs) => Utc
            .timestamp_opt(*secs, 0)
            .single()
            .ok_or_else(|| format!("time {secs} out of range")),
        Value::Text(text) => parse_time_text(text).ok_or_else(|| format!("unrecognised time {text:?}")),
        other => Err(format!("time must be text or integer, got {other:?}")),
    }
}

fn parse_time_text(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(text) {
        return Some(t.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(t) = NaiveDateTime::parse_from_str(text, format) {
            return Some(t.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|t| t.and_utc())
}

fn value_from(value: &Value) -> Result<i64, String> {
    match value {
        Value::Integer(v) => Ok(*v),
        Value::Real(v) if v.fract() == 0.0 && v.abs() < i64::MAX as f64 => Ok(*v as i64),
        other => Err(format!("value must be an integer, got {other:?}")),
    }
}

fn attrs_from(value: &Value) -> Result<Attrs, String> {
    let text = match value {
        Value::Null => return Ok(Attrs::new()),
        Value::Text(text) => text,
        other => return Err(format!("attrs must be a JSON object, got {other:?}")),
    };

    let object: serde_json::Map<String, serde_json::Value> =
        serde_json::from_str(text).map_err(|e| format!("attrs: {e}"))?;
    Ok(object
        .into_iter()
        .map(|(k, v)| match v {
            serde_json::Value::String(s) => (k, s),
            other => (k, other.to_string()),
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Async wrapper
// ---------------------------------------------------------------------------

/// The configured statement bound to its backend.
#[derive(Clone)]
pub struct QueryPath {
    backend: Arc<dyn RangeQuery>,
    sql: Arc<str>,
}

impl QueryPath {
    pub fn new(backend: Arc<dyn RangeQuery>, sql: impl Into<Arc<str>>) -> Self {
        Self {
            backend,
            sql: sql.into(),
        }
    }

    /// Run the statement on the blocking pool and map its rows.
    pub async fn points(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<TimeSeriesPoint>, QueryError> {
        let backend = self.backend.clone();
        let sql = self.sql.clone();

        let rows = tokio::task::spawn_blocking(move || backend.fetch(&sql, start, end))
            .await
            .map_err(|e| QueryError::Task(e.to_string()))??;

        tracing::debug!(rows = rows.rows.len(), %start, %end, "query returned");
        map_rows(rows)
    }
}
