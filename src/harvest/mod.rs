//! Harvest module: fetching, admission control, and orchestration
//!
//! This module contains the core harvesting logic, including:
//! - HTTP fetching with retry and class-specific backoff
//! - Concurrency limiting via the admission gate
//! - Batch orchestration with checkpointing and a final drain pass

mod backoff;
mod client;
mod fetcher;
mod gate;
mod orchestrator;

pub use backoff::{backoff_delay, backoff_policy, ErrorClass};
pub use client::build_http_client;
pub use fetcher::{fetch_page, Exhausted, FetchFailure};
pub use gate::{AdmissionGate, GatePass};
pub use orchestrator::{HarvestReport, Orchestrator, RunOutcome, RunPhase};

use crate::checkpoint::CheckpointStore;
use crate::config::Config;
use crate::shutdown::ShutdownSignal;
use crate::sink::SqliteSink;
use std::path::Path;

/// Runs a complete harvest operation
///
/// This is the main entry point for starting a harvest. It wires the default
/// collaborators (SQLite sink, file-backed checkpoint store, a shutdown signal
/// listening for Ctrl-C) and drives the orchestrator to completion.
///
/// # Arguments
///
/// * `config` - The harvester configuration
/// * `config_hash` - Hash of the configuration file, recorded in checkpoints
/// * `resume` - Attempt to load an existing checkpoint on start
///
/// # Returns
///
/// * `Ok(HarvestReport)` - The run finished (successfully or partially)
/// * `Err(HaulError)` - Setup failed or the catalog size could not be discovered
pub async fn run_harvest(
    config: Config,
    config_hash: String,
    resume: bool,
) -> crate::Result<HarvestReport> {
    let sink = SqliteSink::new(Path::new(&config.output.database_path))?;
    let store = CheckpointStore::new(&config.output.checkpoint_path);

    let shutdown = ShutdownSignal::new();
    shutdown.listen_for_ctrl_c();

    let mut orchestrator = Orchestrator::new(config, config_hash, Box::new(sink), store, shutdown)?;
    orchestrator.run(resume).await
}
