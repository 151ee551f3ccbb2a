use std::collections::BTreeMap;

use serde::Deserialize;

/// Main configuration structure for pagehaul
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub harvester: HarvesterConfig,
    pub source: SourceConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// Harvester behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HarvesterConfig {
    /// Maximum number of pages fetched concurrently
    #[serde(default = "default_concurrency")]
    pub concurrency: u32,

    /// Number of pages processed together as one concurrency round
    #[serde(rename = "batch-size", default = "default_batch_size")]
    pub batch_size: u32,

    /// Number of batches between checkpoint flushes
    #[serde(rename = "checkpoint-interval", default = "default_checkpoint_interval")]
    pub checkpoint_interval: u32,

    /// Retry budget per page fetch
    #[serde(rename = "max-attempts", default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// One backoff time unit (milliseconds); retry delays are powers of two
    /// multiplied by this unit
    #[serde(rename = "backoff-unit-ms", default = "default_backoff_unit_ms")]
    pub backoff_unit_ms: u64,

    /// Pause between batches (milliseconds), independent of the concurrency cap
    #[serde(rename = "batch-pause-ms", default = "default_batch_pause_ms")]
    pub batch_pause_ms: u64,
}

fn default_concurrency() -> u32 {
    10
}

fn default_batch_size() -> u32 {
    50
}

fn default_checkpoint_interval() -> u32 {
    5
}

fn default_max_attempts() -> u32 {
    5
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_backoff_unit_ms() -> u64 {
    1000
}

fn default_batch_pause_ms() -> u64 {
    500
}

/// Upstream catalog API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Catalog endpoint URL (pagination query parameters are appended)
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Number of catalog items requested per page
    #[serde(rename = "per-page")]
    pub per_page: u32,

    /// Extra query parameters sent with every request
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the harvester
    #[serde(rename = "harvester-name")]
    pub harvester_name: String,

    /// Version of the harvester
    #[serde(rename = "harvester-version")]
    pub harvester_version: String,

    /// URL with information about the harvester
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for harvester-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file records are appended to
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Path to the checkpoint file
    #[serde(rename = "checkpoint-path")]
    pub checkpoint_path: String,
}
