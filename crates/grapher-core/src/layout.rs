//! Time-parse layouts for the `time` field.
//!
//! `DT_LOG_FORMAT` is accepted in two spellings:
//!
//! - a strftime format (anything containing `%`), used as is;
//! - a reference-time layout, where the fields of the reference instant
//!   `Mon Jan 2 15:04:05 MST 2006` stand for themselves (`Jan _2 15:04:05`,
//!   `2006-01-02T15:04:05Z07:00`, ...). It is translated to strftime once.
//!
//! Layouts without a year (syslog style) get the current year injected at
//! parse time.

use crate::error::ConfigError;
use chrono::format::{Item, Parsed, StrftimeItems};
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveTime, Utc};
use thiserror::Error;

/// A time string did not fit the layout.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct TimeParseError(String);

impl From<chrono::format::ParseError> for TimeParseError {
    fn from(err: chrono::format::ParseError) -> Self {
        Self(err.to_string())
    }
}

/// A validated `DT_LOG_FORMAT`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeLayout {
    /// The layout as configured.
    source: String,
    /// Equivalent strftime format.
    format: String,
}

impl TimeLayout {
    pub fn parse(layout: &str) -> Result<Self, ConfigError> {
        if layout.trim().is_empty() {
            return Err(ConfigError::InvalidLayout {
                layout: layout.to_string(),
                reason: "layout is empty".to_string(),
            });
        }

        let format = if layout.contains('%') {
            layout.to_string()
        } else {
            translate_reference_layout(layout)
        };

        if StrftimeItems::new(&format).any(|item| matches!(item, Item::Error)) {
            return Err(ConfigError::InvalidLayout {
                layout: layout.to_string(),
                reason: format!("unsupported specifier in {format:?}"),
            });
        }

        Ok(Self {
            source: layout.to_string(),
            format,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// The strftime format actually used for parsing.
    pub fn format(&self) -> &str {
        &self.format
    }

    /// Parse `text`, injecting `current_year` when the text carries no year.
    ///
    /// Missing fields default the way the reference layouts do: month and
    /// day to January 1, hour, minute and second to zero. A yearless date
    /// is read against a leap year and then moved to `current_year`, so
    /// `Feb 29` in a common year lands on March 1. Weekday names in a
    /// yearless date are not checked. A zone offset in the text is
    /// honoured; otherwise the time is taken as UTC.
    pub fn parse_time(&self, text: &str, current_year: i32) -> Result<DateTime<Utc>, TimeParseError> {
        let mut parsed = Parsed::new();
        chrono::format::parse(&mut parsed, text, StrftimeItems::new(&self.format))?;

        if parsed.timestamp().is_some() {
            return Ok(parsed.to_datetime()?.with_timezone(&Utc));
        }

        let date = parsed_date(&parsed, current_year)?;
        let time = parsed_time(&parsed)?;

        let offset = parsed.offset().unwrap_or(0);
        FixedOffset::east_opt(offset)
            .and_then(|tz| date.and_time(time).and_local_timezone(tz).single())
            .map(|t| t.with_timezone(&Utc))
            .ok_or_else(|| TimeParseError(format!("offset {offset}s out of range")))
    }
}

/// Any leap year works; only month and day survive the move.
const YEARLESS_BASE: i32 = 2000;

fn parsed_date(parsed: &Parsed, current_year: i32) -> Result<NaiveDate, TimeParseError> {
    let has_year =
        parsed.year().is_some() || parsed.year_mod_100().is_some() || parsed.isoyear().is_some();
    let has_week = parsed.isoweek().is_some()
        || parsed.week_from_mon().is_some()
        || parsed.week_from_sun().is_some();

    if has_year {
        let mut parsed = parsed.clone();
        if parsed.month().is_none() && parsed.ordinal().is_none() && !has_week {
            parsed.set_month(1)?;
        }
        if parsed.month().is_some() && parsed.day().is_none() {
            parsed.set_day(1)?;
        }
        return Ok(parsed.to_naive_date()?);
    }

    let base = match parsed.ordinal() {
        Some(ordinal) => NaiveDate::from_yo_opt(YEARLESS_BASE, ordinal),
        None => NaiveDate::from_ymd_opt(
            YEARLESS_BASE,
            parsed.month().unwrap_or(1),
            parsed.day().unwrap_or(1),
        ),
    }
    .ok_or_else(|| TimeParseError("day out of range for month".to_string()))?;

    base.with_year(current_year)
        .or_else(|| NaiveDate::from_ymd_opt(current_year, 3, 1))
        .ok_or_else(|| TimeParseError(format!("year {current_year} out of range")))
}

fn parsed_time(parsed: &Parsed) -> Result<NaiveTime, TimeParseError> {
    let hour = match (parsed.hour_div_12(), parsed.hour_mod_12()) {
        (Some(div), Some(rem)) => div * 12 + rem,
        (None, Some(rem)) => rem,
        (Some(div), None) => div * 12,
        (None, None) => 0,
    };
    let minute = parsed.minute().unwrap_or(0);
    let (second, nano) = match (parsed.second().unwrap_or(0), parsed.nanosecond().unwrap_or(0)) {
        // Leap second.
        (60, nano) => (59, nano + 1_000_000_000),
        other => other,
    };

    NaiveTime::from_hms_nano_opt(hour, minute, second, nano)
        .ok_or_else(|| TimeParseError(format!("time {hour:02}:{minute:02}:{second:02} out of range")))
}

// ---------------------------------------------------------------------------
// Reference layout translation
// ---------------------------------------------------------------------------

/// Reference tokens and their strftime equivalents. Earlier entries win, so
/// longer tokens come before their prefixes.
const REFERENCE_TOKENS: &[(&str, &str)] = &[
    ("January", "%B"),
    ("Jan", "%b"),
    ("Monday", "%A"),
    ("Mon", "%a"),
    ("MST", "%Z"),
    ("2006", "%Y"),
    ("-07:00:00", "%::z"),
    ("-0700", "%z"),
    ("-07:00", "%:z"),
    ("-07", "%#z"),
    ("Z07:00", "%#z"),
    ("Z0700", "%#z"),
    ("Z07", "%#z"),
    ("002", "%j"),
    ("01", "%m"),
    ("02", "%d"),
    ("03", "%I"),
    ("04", "%M"),
    ("05", "%S"),
    ("06", "%y"),
    ("_2", "%e"),
    ("15", "%H"),
    ("1", "%m"),
    ("2", "%d"),
    ("3", "%I"),
    ("4", "%M"),
    ("5", "%S"),
    ("PM", "%p"),
    ("pm", "%p"),
];

fn translate_reference_layout(layout: &str) -> String {
    let mut out = String::with_capacity(layout.len() * 2);
    let mut rest = layout;

    while let Some(ch) = rest.chars().next() {
        if let Some((len, spec)) = reference_token(rest) {
            out.push_str(spec);
            rest = &rest[len..];
            continue;
        }
        if ch == '%' {
            out.push_str("%%");
        } else {
            out.push(ch);
        }
        rest = &rest[ch.len_utf8()..];
    }

    out
}

/// Match a reference token at the start of `s`, returning its byte length
/// and strftime spelling.
fn reference_token(s: &str) -> Option<(usize, &'static str)> {
    if let Some(digits) = s.strip_prefix('.') {
        let zeros = digits.bytes().take_while(|b| *b == b'0').count();
        let nines = digits.bytes().take_while(|b| *b == b'9').count();
        let width = zeros.max(nines);
        let followed_by_digit = digits[width..].starts_with(|c: char| c.is_ascii_digit());
        if width > 0 && !followed_by_digit {
            let spec = match (zeros > 0, width) {
                (true, 3) => "%.3f",
                (true, 6) => "%.6f",
                (true, 9) => "%.9f",
                _ => "%.f",
            };
            return Some((1 + width, spec));
        }
    }

    REFERENCE_TOKENS
        .iter()
        .find(|(token, _)| s.starts_with(token))
        .map(|(token, spec)| (token.len(), *spec))
}
