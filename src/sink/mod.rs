//! Sink module for persisting normalized records
//!
//! The sink is an append-only, duplicate-tolerant, key-addressable store;
//! record order is task-resolution order, not page order, and re-appends
//! across resumed runs replace prior rows rather than erroring.

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteSink;
pub use traits::{RecordSink, SinkError, SinkResult};
