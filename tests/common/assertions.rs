//! Domain-specific assertion macros for grapher harnesses.
//!
//! These wrap `pretty_assertions` and add context-rich failure messages that
//! make it clear which series property was violated.

// ---------------------------------------------------------------------------
// Bucket assertions
// ---------------------------------------------------------------------------

/// Assert the bucket at `idx` has the given RFC 3339 time and value.
///
/// ```rust
/// assert_bucket!(series, 0, "2024-01-05T10:00:00Z", 2);
/// ```
#[macro_export]
macro_rules! assert_bucket {
    ($series:expr, $idx:expr, $time:expr, $value:expr) => {{
        let points: &[grapher_core::TimeSeriesPoint] = $series.points();
        let idx: usize = $idx;
        match points.get(idx) {
            Some(point) => {
                let expected_time = $crate::common::utc($time);
                if point.time != expected_time || point.value != $value {
                    panic!(
                        "assert_bucket! failed at index {}:\n  expected: {} = {}\n  actual:   {} = {}",
                        idx, expected_time, $value, point.time, point.value
                    );
                }
            }
            None => panic!(
                "assert_bucket! failed: no bucket at index {} (series has {})",
                idx,
                points.len()
            ),
        }
    }};
}

/// Assert that no two buckets share a time.
#[macro_export]
macro_rules! assert_unique_buckets {
    ($series:expr) => {{
        let points: &[grapher_core::TimeSeriesPoint] = $series.points();
        let mut seen = std::collections::HashSet::new();
        for point in points {
            if !seen.insert(point.time) {
                panic!(
                    "assert_unique_buckets! failed: {} appears twice in {:?}",
                    point.time,
                    points.iter().map(|p| p.time).collect::<Vec<_>>()
                );
            }
        }
    }};
}

// ---------------------------------------------------------------------------
// Response assertions
// ---------------------------------------------------------------------------

/// Assert an HTTP response status, printing the body on mismatch.
#[macro_export]
macro_rules! assert_status {
    ($status:expr, $body:expr, $expected:expr) => {{
        let status: axum::http::StatusCode = $status;
        let expected: axum::http::StatusCode = $expected;
        if status != expected {
            panic!(
                "assert_status! failed:\n  expected: {}\n  actual:   {}\n  body: {}",
                expected,
                status,
                String::from_utf8_lossy(&$body)
            );
        }
    }};
}
