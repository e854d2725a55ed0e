//! Shared test utilities for grapher integration harnesses.
//!
//! Import everything you need via `mod common; use common::*;` at the top of
//! each harness file. Feed-driven helpers are deterministic under
//! `tokio::time::pause()`.

#![allow(dead_code)]

pub mod assertions;
pub mod builders;
pub mod fake_feed;
pub mod fixtures;

pub use builders::*;
pub use fake_feed::*;
pub use fixtures::*;
