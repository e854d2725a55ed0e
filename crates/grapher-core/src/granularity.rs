//! Truncation granularity (`TIME_TRUNC`).

use crate::error::ConfigError;
use chrono::{DateTime, DurationRound, RoundingError, TimeDelta, Utc};
use std::fmt;

/// Width of one bucket. Always strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Granularity(TimeDelta);

impl Granularity {
    /// Parse a duration such as `1m`, `90s`, `1h30m` or `500ms`.
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidGranularity {
            value: value.to_string(),
            reason,
        };

        let std = humantime::parse_duration(value.trim()).map_err(|e| invalid(e.to_string()))?;
        let delta = TimeDelta::from_std(std).map_err(|e| invalid(e.to_string()))?;
        Self::new(delta).ok_or_else(|| invalid("must be greater than zero".to_string()))
    }

    /// `None` for zero or negative widths.
    pub fn new(delta: TimeDelta) -> Option<Self> {
        (delta > TimeDelta::zero()).then_some(Self(delta))
    }

    /// A width of `n` minutes. `n` below one is raised to one minute, and a
    /// count too large for a [`TimeDelta`] saturates at its maximum.
    pub fn minutes(n: i64) -> Self {
        Self(TimeDelta::try_minutes(n.max(1)).unwrap_or(TimeDelta::MAX))
    }

    pub fn as_delta(&self) -> TimeDelta {
        self.0
    }

    /// Floor `time` to a multiple of the granularity since the Unix epoch.
    pub fn truncate(&self, time: DateTime<Utc>) -> Result<DateTime<Utc>, RoundingError> {
        time.duration_trunc(self.0)
    }
}

impl Default for Granularity {
    fn default() -> Self {
        Self::minutes(1)
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.to_std() {
            Ok(std) => write!(f, "{}", humantime::format_duration(std)),
            Err(_) => write!(f, "{}", self.0),
        }
    }
}
