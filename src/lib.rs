//! Pagehaul: a crash-safe paginated catalog harvester
//!
//! This crate implements a fault-tolerant engine that harvests a large paginated
//! API catalog under a bounded concurrency budget, with retry/backoff for
//! transient failures, durable checkpoints for resume after interruption, and a
//! final drain pass over failed pages.

pub mod catalog;
pub mod checkpoint;
pub mod config;
pub mod harvest;
pub mod shutdown;
pub mod sink;
pub mod state;

use thiserror::Error;

/// Main error type for pagehaul operations
#[derive(Debug, Error)]
pub enum HaulError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to discover catalog size: {0}")]
    Discovery(String),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Sink error: {0}")]
    Sink(#[from] sink::SinkError),

    #[error("Checkpoint error: {0}")]
    Checkpoint(#[from] checkpoint::CheckpointError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for pagehaul operations
pub type Result<T> = std::result::Result<T, HaulError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use catalog::{normalize_product, CatalogPage, Product};
pub use checkpoint::{CheckpointStore, Snapshot};
pub use config::Config;
pub use harvest::{HarvestReport, Orchestrator, RunOutcome};
pub use shutdown::ShutdownSignal;
pub use state::{HarvestProgress, PageState};
