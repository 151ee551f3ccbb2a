//! Record sink trait and error types

use crate::catalog::Product;
use thiserror::Error;

/// Errors that can occur during sink operations
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Write failed: {0}")]
    Write(String),
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Trait for durable record stores
///
/// Sinks are append-only and duplicate-tolerant: `append_records` may be
/// invoked multiple times with overlapping records across resumed runs (a
/// page re-fetched after a crash preceding the last checkpoint flush), and
/// implementations must absorb that without error.
pub trait RecordSink {
    /// Appends a batch of normalized records
    ///
    /// # Arguments
    ///
    /// * `records` - The records to persist; ownership of their content
    ///   effectively passes to the sink here
    ///
    /// # Returns
    ///
    /// The number of records written
    fn append_records(&mut self, records: &[Product]) -> SinkResult<usize>;

    /// Returns the number of records currently persisted
    fn record_count(&self) -> SinkResult<u64>;
}
