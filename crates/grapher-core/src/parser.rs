//! LineParser: turns one raw log line into a [`TimeSeriesPoint`].
//!
//! Parsing is a pure function of the line, the [`Schema`], the
//! [`TimeLayout`] and the [`Granularity`], plus the current calendar year for
//! layouts that carry none.

use crate::error::{ConfigError, ParseError};
use crate::granularity::Granularity;
use crate::layout::TimeLayout;
use crate::schema::Schema;
use crate::types::{Attrs, TimeSeriesPoint};
use chrono::{Datelike, Local};
use std::str::FromStr;

/// What the ingestor does with a line that fails to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseErrorPolicy {
    /// Stop ingestion on the first bad line.
    #[default]
    Fatal,
    /// Log the line and keep going.
    Skip,
}

impl FromStr for ParseErrorPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "fatal" => Ok(Self::Fatal),
            "skip" => Ok(Self::Skip),
            _ => Err(ConfigError::InvalidPolicy(s.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LineParser {
    schema: Schema,
    layout: TimeLayout,
    granularity: Granularity,
}

impl LineParser {
    pub fn new(schema: Schema, layout: TimeLayout, granularity: Granularity) -> Self {
        Self {
            schema,
            layout,
            granularity,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// Parse `line`, filling a missing year with the current local year.
    pub fn parse(&self, line: &[u8]) -> Result<TimeSeriesPoint, ParseError> {
        self.parse_with_year(line, Local::now().year())
    }

    /// Parse `line`, filling a missing year with `current_year`.
    ///
    /// Lines near a year boundary that are processed after the rollover get
    /// the new year.
    pub fn parse_with_year(
        &self,
        line: &[u8],
        current_year: i32,
    ) -> Result<TimeSeriesPoint, ParseError> {
        let line = String::from_utf8_lossy(line);
        let line = line.trim_end_matches(['\r', '\n']);

        let captures = self
            .schema
            .pattern()
            .captures(line)
            .filter(|c| c.len() == self.schema.capture_count())
            .ok_or_else(|| ParseError::NoMatch {
                line: line.to_string(),
            })?;

        let raw_time = captures
            .get(self.schema.time_index())
            .ok_or_else(|| ParseError::NoMatch {
                line: line.to_string(),
            })?
            .as_str();

        let time = self
            .layout
            .parse_time(raw_time, current_year)
            .map_err(|_| ParseError::InvalidTime {
                value: raw_time.to_string(),
            })?;

        let time = self
            .granularity
            .truncate(time)
            .map_err(|e| ParseError::Truncate {
                value: raw_time.to_string(),
                reason: e.to_string(),
            })?;

        let attrs: Attrs = self
            .schema
            .attr_fields()
            .map(|field| {
                let value = captures.get(field.index).map_or("", |m| m.as_str());
                (field.name.clone(), value.to_string())
            })
            .collect();

        Ok(TimeSeriesPoint::new(time, 1).with_attrs(attrs))
    }
}
