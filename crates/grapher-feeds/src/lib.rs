//! grapher-feeds: where the series comes from.
//!
//! In ingestion mode an [`Ingestor`] tails an [`InputSource`] and merges
//! parsed lines into a [`grapher_core::ResultStore`]. In query mode a
//! [`QueryPath`] runs the configured SQL statement per request.

pub mod ingestor;
pub mod query;
pub mod source;
pub mod sqlite;

pub use ingestor::{IngestError, IngestSummary, Ingestor, DEFAULT_BACKOFF};
pub use query::{map_rows, QueryError, QueryPath, QueryRows, RangeQuery, Value};
pub use source::InputSource;
pub use sqlite::SqliteRangeQuery;
