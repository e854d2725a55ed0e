//! Store: the live, bucketed time series.
//!
//! [`Series`] is the plain ordered bucket list with the merge rule.
//! [`ResultStore`] publishes it to concurrent readers: every merge builds the
//! next `Series` from the current snapshot and swaps it in atomically, so a
//! reader always holds a complete snapshot and never blocks the writer.

use crate::types::TimeSeriesPoint;
use arc_swap::ArcSwap;
use std::sync::Arc;

/// Buckets in first-seen order, unique by `time`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Series {
    points: Vec<TimeSeriesPoint>,
}

impl Series {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold `point` into the series.
    ///
    /// An existing bucket with the same `time` gains `point.value` and keeps
    /// its attributes; otherwise `point` is appended. Linear in the number of
    /// buckets, which is bounded by the observed window over the granularity.
    pub fn merge(&mut self, point: TimeSeriesPoint) {
        match self.points.iter_mut().find(|p| p.time == point.time) {
            Some(bucket) => bucket.value += point.value,
            None => self.points.push(point),
        }
    }

    pub fn points(&self) -> &[TimeSeriesPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Sum of all bucket values.
    pub fn total(&self) -> i64 {
        self.points.iter().map(|p| p.value).sum()
    }
}

impl FromIterator<TimeSeriesPoint> for Series {
    fn from_iter<I: IntoIterator<Item = TimeSeriesPoint>>(iter: I) -> Self {
        let mut series = Series::new();
        for point in iter {
            series.merge(point);
        }
        series
    }
}

/// Shared handle to the published series.
#[derive(Debug)]
pub struct ResultStore {
    current: ArcSwap<Series>,
}

impl Default for ResultStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultStore {
    pub fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(Series::new()),
        }
    }

    /// Merge `point` and publish the resulting series.
    pub fn merge(&self, point: TimeSeriesPoint) {
        self.current.rcu(|current| {
            let mut next = Series::clone(current);
            next.merge(point.clone());
            next
        });
    }

    /// The latest published series. Cheap; does not copy the buckets.
    pub fn snapshot(&self) -> Arc<Series> {
        self.current.load_full()
    }
}
