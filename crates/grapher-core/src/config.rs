//! Configuration types for grapher.
//!
//! [`Settings::from_env`] layers the process environment over built-in
//! defaults. Empty variables fall back to the default. [`Settings::mode`]
//! then resolves the operating mode and validates everything ingestion
//! needs, so a bad pattern or layout fails before the server starts.

use crate::error::ConfigError;
use crate::granularity::Granularity;
use crate::layout::TimeLayout;
use crate::parser::{LineParser, ParseErrorPolicy};
use crate::schema::Schema;
use serde::Deserialize;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Embedded defaults
// ---------------------------------------------------------------------------

const DEFAULT_CONFIG: &str = r#"
query              = ""
dsn                = ""
log_regex          = ""
dt_log_format      = ""
time_trunc         = "1m"
port               = ":6060"
env                = ""
parse_error_policy = "fatal"
public_dir         = "public"
"#;

// ---------------------------------------------------------------------------
// Raw settings
// ---------------------------------------------------------------------------

/// Settings as read from the environment, before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// SQL text; non-blank selects query mode.
    pub query: String,
    /// SQLite database path or URI for query mode.
    pub dsn: String,
    pub log_regex: String,
    pub dt_log_format: String,
    pub time_trunc: String,
    pub port: String,
    pub env: String,
    pub parse_error_policy: String,
    /// Front-end assets for every path but `/data`. Nothing is bundled, so
    /// this must point at a built front end for the UI to load.
    pub public_dir: PathBuf,
}

impl Settings {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(config::Environment::default())
    }

    /// Load from an explicit variable map instead of the process environment.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map: config::Map<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::load(config::Environment::default().source(Some(map)))
    }

    fn load(env: config::Environment) -> Result<Self, ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .add_source(env.ignore_empty(true))
            .build()?
            .try_deserialize()
            .map_err(Into::into)
    }

    /// `ENV=dev` turns on verbose diagnostics.
    pub fn is_dev(&self) -> bool {
        self.env.trim().eq_ignore_ascii_case("dev")
    }

    /// Resolve the operating mode, validating its inputs.
    pub fn mode(&self) -> Result<Mode, ConfigError> {
        if !self.query.trim().is_empty() {
            if self.dsn.trim().is_empty() {
                return Err(ConfigError::MissingDsn);
            }
            return Ok(Mode::Query(QueryConfig {
                sql: self.query.clone(),
                dsn: self.dsn.trim().to_string(),
            }));
        }

        let schema = Schema::derive(&self.log_regex)?;
        let layout = TimeLayout::parse(&self.dt_log_format)?;
        let granularity = Granularity::parse(&self.time_trunc)?;
        let policy = self.parse_error_policy.parse()?;

        Ok(Mode::Ingest(IngestConfig {
            parser: LineParser::new(schema, layout, granularity),
            policy,
        }))
    }

    /// Normalise `PORT` (`:6060`, `6060` or `host:port`) into a bindable
    /// address.
    pub fn listen_addr(&self) -> Result<String, ConfigError> {
        let port = self.port.trim();
        let addr = match port.strip_prefix(':') {
            Some(p) => format!("0.0.0.0:{p}"),
            None if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) => {
                format!("0.0.0.0:{port}")
            }
            None => port.to_string(),
        };

        match addr.rsplit_once(':') {
            Some((host, p)) if !host.is_empty() && p.parse::<u16>().is_ok() => Ok(addr),
            _ => Err(ConfigError::InvalidAddress(self.port.clone())),
        }
    }
}

// ---------------------------------------------------------------------------
// Resolved mode
// ---------------------------------------------------------------------------

/// Where the served series comes from. The two modes are exclusive.
#[derive(Debug, Clone)]
pub enum Mode {
    Ingest(IngestConfig),
    Query(QueryConfig),
}

#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub parser: LineParser,
    pub policy: ParseErrorPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryConfig {
    pub sql: String,
    pub dsn: String,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
