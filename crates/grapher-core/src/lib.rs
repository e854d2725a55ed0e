//! grapher-core: schema-driven log parsing and time-bucketed aggregation.
//!
//! This crate holds the pure parts of the pipeline plus the shared store:
//!
//! ```text
//! raw line ──► LineParser ──► TimeSeriesPoint ──► ResultStore ──► JSON
//!                 │
//!        Schema + TimeLayout + Granularity
//! ```
//!
//! The ingestion loop that drives it lives in `grapher-feeds`.

pub mod config;
pub mod error;
pub mod granularity;
pub mod layout;
pub mod parser;
pub mod schema;
pub mod store;
pub mod types;

pub use config::{IngestConfig, Mode, QueryConfig, Settings};
pub use error::{ConfigError, ParseError};
pub use granularity::Granularity;
pub use layout::TimeLayout;
pub use parser::{LineParser, ParseErrorPolicy};
pub use schema::Schema;
pub use store::{ResultStore, Series};
pub use types::{Attrs, Report, TimeSeriesPoint};
