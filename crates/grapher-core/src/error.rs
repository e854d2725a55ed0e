//! Error taxonomy for the ingestion path.
//!
//! [`ConfigError`] is raised once at startup and is always fatal.
//! [`ParseError`] is raised per line; whether it ends ingestion is decided by
//! the ingestor's [`ParseErrorPolicy`](crate::parser::ParseErrorPolicy).

use thiserror::Error;

/// Invalid startup configuration. The process exits before serving.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid LOG_REGEX: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("LOG_REGEX must define a named group 'time'")]
    MissingTimeField,

    #[error("invalid DT_LOG_FORMAT {layout:?}: {reason}")]
    InvalidLayout { layout: String, reason: String },

    #[error("invalid TIME_TRUNC {value:?}: {reason}")]
    InvalidGranularity { value: String, reason: String },

    #[error("invalid PARSE_ERROR_POLICY {0:?}: expected 'fatal' or 'skip'")]
    InvalidPolicy(String),

    #[error("DSN must be set when QUERY is set")]
    MissingDsn,

    #[error("invalid PORT {0:?}")]
    InvalidAddress(String),

    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),
}

/// A single line could not be turned into a point.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid line format: {line:?}")]
    NoMatch { line: String },

    #[error("invalid time format: '{value}'")]
    InvalidTime { value: String },

    #[error("cannot truncate time '{value}': {reason}")]
    Truncate { value: String, reason: String },
}
