//! Core types for grapher-core.
//!
//! This module defines the data shapes shared across every layer: the
//! per-bucket [`TimeSeriesPoint`] and the [`Report`] payload served by
//! `GET /data`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Attributes captured from a log line: every named group except `time`.
///
/// All captures from a text pattern are strings, so the map is uniformly
/// string-valued. A `BTreeMap` keeps the JSON output stable across runs.
pub type Attrs = BTreeMap<String, String>;

/// One bucket of the time series.
///
/// Produced by the line parser with `value = 1` and a `time` already
/// truncated to the configured granularity; merged into a
/// [`Series`](crate::store::Series) afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeSeriesPoint {
    /// Bucket start (UTC). Serialized as RFC 3339.
    pub time: DateTime<Utc>,
    /// Number of lines (or the query's `value` column) for this bucket.
    pub value: i64,
    /// Attributes of the line that opened the bucket. Omitted from JSON when
    /// empty.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: Attrs,
}

impl TimeSeriesPoint {
    /// A single-line point with no attributes.
    pub fn new(time: DateTime<Utc>, value: i64) -> Self {
        Self {
            time,
            value,
            attrs: Attrs::new(),
        }
    }

    pub fn with_attrs(mut self, attrs: Attrs) -> Self {
        self.attrs = attrs;
        self
    }
}

/// Response body of `GET /data`.
#[derive(Debug, Clone, Serialize)]
pub struct Report<'a> {
    pub title: &'a str,
    pub results: &'a [TimeSeriesPoint],
}

/// Title used when the series comes from the tailed input.
pub const INPUT_REPORT_TITLE: &str = "Report from input";

/// Title used when the series comes from the configured SQL query.
pub const QUERY_REPORT_TITLE: &str = "Report from query";
