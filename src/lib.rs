//! grapher: turns a log stream into a time series served over HTTP.
//!
//! The binary runs in one of two exclusive modes:
//!
//! ```text
//! ingestion:  file/stdin ──► Ingestor ──► ResultStore ──┐
//!                                                       ├──► GET /data (JSON)
//! query:      GET /data ──► QueryPath ──► SQLite ───────┘
//! ```
//!
//! Parsing, bucketing and the shared store live in `grapher-core`; the
//! ingestion loop and the SQL backend in `grapher-feeds`. This crate wires
//! them to the HTTP surface and the process lifecycle.

pub mod app;
pub mod server;
pub mod telemetry;
