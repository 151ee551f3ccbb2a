//! Harvest orchestration
//!
//! The orchestrator drives a complete run: discover the catalog size,
//! partition the page range into batches, dispatch concurrent fetches through
//! the admission gate, join each batch, hand normalized records to the sink,
//! flush checkpoints periodically, honor shutdown at batch boundaries, and
//! drain outstanding failures before reporting the outcome.
//!
//! The completed/failed sets are mutated exclusively here, strictly after the
//! per-batch join. Fetch tasks never touch shared state, so no lock is needed
//! around the bookkeeping.

use crate::catalog::normalize_product;
use crate::checkpoint::CheckpointStore;
use crate::config::Config;
use crate::harvest::client::build_http_client;
use crate::harvest::fetcher::fetch_page;
use crate::harvest::gate::AdmissionGate;
use crate::shutdown::ShutdownSignal;
use crate::sink::RecordSink;
use crate::state::{page_count, HarvestProgress};
use crate::{HaulError, Result};
use reqwest::Client;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Run-level phase of the harvest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    NotStarted,
    Discovering,
    Running,
    Draining,
    Finished,
}

impl RunPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::Discovering => "discovering",
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Finished => "finished",
        }
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Final outcome of a harvest run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every page completed and no failures remain
    Success,

    /// The run stopped early or left failed pages behind
    Partial,
}

/// Caller-facing summary of a finished run
#[derive(Debug, Clone)]
pub struct HarvestReport {
    pub outcome: RunOutcome,
    pub total_pages: u32,
    pub completed_pages: usize,
    pub scraped_count: u64,
    pub failed_pages: Vec<u32>,
    pub elapsed: Duration,
}

impl HarvestReport {
    pub fn is_success(&self) -> bool {
        self.outcome == RunOutcome::Success
    }
}

/// Top-level driver of a harvest run
pub struct Orchestrator {
    config: Arc<Config>,
    config_hash: String,
    client: Client,
    gate: AdmissionGate,
    store: CheckpointStore,
    sink: Box<dyn RecordSink + Send>,
    shutdown: ShutdownSignal,
    progress: HarvestProgress,
    phase: RunPhase,
}

impl Orchestrator {
    /// Creates a new orchestrator
    ///
    /// # Arguments
    ///
    /// * `config` - Validated harvester configuration
    /// * `config_hash` - Hash of the configuration file, recorded in checkpoints
    /// * `sink` - Durable store accepting normalized records
    /// * `store` - Checkpoint storage
    /// * `shutdown` - Cooperative termination flag, read at batch boundaries
    pub fn new(
        config: Config,
        config_hash: String,
        sink: Box<dyn RecordSink + Send>,
        store: CheckpointStore,
        shutdown: ShutdownSignal,
    ) -> Result<Self> {
        let client = build_http_client(&config.user_agent, config.harvester.request_timeout_secs)?;
        let gate = AdmissionGate::new(config.harvester.concurrency as usize);

        Ok(Self {
            config: Arc::new(config),
            config_hash,
            client,
            gate,
            store,
            sink,
            shutdown,
            progress: HarvestProgress::new(),
            phase: RunPhase::NotStarted,
        })
    }

    /// Current run bookkeeping (read-only)
    pub fn progress(&self) -> &HarvestProgress {
        &self.progress
    }

    /// Runs the harvest to completion
    ///
    /// With `resume` set, a usable checkpoint seeds the completed/failed sets
    /// and the discovered total; otherwise (or when no checkpoint exists) the
    /// run starts fresh with a discovery fetch of page 1.
    ///
    /// The only fatal error is a failed discovery on a fresh run; every other
    /// failure is local to a page or a batch and is reflected in the report.
    pub async fn run(&mut self, resume: bool) -> Result<HarvestReport> {
        let started = Instant::now();

        if resume {
            if let Some(snapshot) = self.store.load() {
                if !snapshot.config_hash.is_empty() && snapshot.config_hash != self.config_hash {
                    tracing::warn!(
                        "Checkpoint was written under a different configuration; resuming anyway"
                    );
                }
                self.progress = HarvestProgress::from_snapshot(&snapshot);
            }
        }

        if self.progress.total_units() == 0 {
            self.set_phase(RunPhase::Discovering);
            self.discover_total().await?;
        }

        let total_pages = page_count(
            self.progress.total_units(),
            self.config.source.per_page,
        );
        tracing::info!(
            "Catalog: {} items across {} pages",
            self.progress.total_units(),
            total_pages
        );

        self.set_phase(RunPhase::Running);
        let batch_size = self.config.harvester.batch_size;
        let checkpoint_interval = self.config.harvester.checkpoint_interval;
        let batch_pause = Duration::from_millis(self.config.harvester.batch_pause_ms);

        let mut batches_processed = 0u32;
        let mut batch_start = 1u32;

        while batch_start <= total_pages {
            let batch_end = batch_start.saturating_add(batch_size - 1).min(total_pages);

            // Shutdown is honored only here, between batches; a set flag means
            // no partial batch is ever started.
            if self.shutdown.is_set() {
                tracing::warn!("Shutdown requested; stopping before pages {}-{}", batch_start, batch_end);
                break;
            }

            let pages = self.progress.pending_pages(batch_start..=batch_end);
            if pages.is_empty() {
                tracing::debug!(
                    "Skipping pages {}-{} (already completed)",
                    batch_start,
                    batch_end
                );
                batch_start = batch_end + 1;
                continue;
            }

            tracing::info!(
                "Processing pages {} to {} of {}",
                batch_start,
                batch_end,
                total_pages
            );

            if let Err(e) = self.process_batch(&pages).await {
                // A sink failure is not fatal to the harvest; save what we
                // know and move on. The batch's records are not retried.
                tracing::error!(
                    "Error persisting batch {}-{}: {}",
                    batch_start,
                    batch_end,
                    e
                );
                self.flush_checkpoint();
                batches_processed += 1;
                batch_start = batch_end + 1;
                continue;
            }

            self.log_progress(total_pages, started);

            batches_processed += 1;
            if batches_processed % checkpoint_interval == 0 {
                self.flush_checkpoint();
            }

            // Throttle between batches, independent of the concurrency cap
            tokio::time::sleep(batch_pause).await;

            batch_start = batch_end + 1;
        }

        // The checkpoint must cover everything the loop decided, whether we
        // got here by exhaustion or by shutdown.
        self.flush_checkpoint();

        if !self.shutdown.is_set() {
            let drain_pages = self.progress.drain_candidates();
            if !drain_pages.is_empty() {
                self.set_phase(RunPhase::Draining);
                tracing::info!("Retrying {} failed pages...", drain_pages.len());
                if let Err(e) = self.process_batch(&drain_pages).await {
                    tracing::error!("Error persisting drain batch: {}", e);
                }
                self.flush_checkpoint();
            }
        }

        self.set_phase(RunPhase::Finished);
        self.finish(total_pages, started.elapsed())
    }

    /// Discovers the catalog size from the first page
    ///
    /// Failure here on a fresh run is fatal: without a total, batching cannot
    /// be planned. The discovery payload itself is discarded; page 1 is
    /// fetched again by the first batch.
    async fn discover_total(&mut self) -> Result<()> {
        tracing::info!("Fetching total catalog size...");

        let _pass = self.gate.admit().await;
        let first_page = fetch_page(
            &self.client,
            &self.config.source,
            &self.config.harvester,
            1,
        )
        .await
        .map_err(|e| HaulError::Discovery(e.to_string()))?;

        let total = first_page.meta.total;
        if total == 0 {
            return Err(HaulError::Discovery(
                "source reported zero catalog items".to_string(),
            ));
        }

        self.progress.set_total_units(total);
        Ok(())
    }

    /// Fetches one batch of pages concurrently and absorbs the results
    ///
    /// Each page independently acquires a gate pass and runs its full retry
    /// sequence inside it. This waits for every sibling (a barrier); one
    /// page's failure never aborts the rest. All bookkeeping mutation happens
    /// after the barrier, on this control flow.
    ///
    /// Returns an error only for sink write failures; fetch failures are
    /// recorded in the failed list.
    async fn process_batch(&mut self, pages: &[u32]) -> Result<()> {
        let mut handles = Vec::with_capacity(pages.len());
        for &page in pages {
            let client = self.client.clone();
            let gate = self.gate.clone();
            let config = Arc::clone(&self.config);
            handles.push((
                page,
                tokio::spawn(async move {
                    let _pass = gate.admit().await;
                    fetch_page(&client, &config.source, &config.harvester, page).await
                }),
            ));
        }

        let mut records = Vec::new();
        for (page, handle) in handles {
            match handle.await {
                Ok(Ok(catalog_page)) => {
                    // Items that fail normalization are dropped individually;
                    // the page still completed.
                    for raw in &catalog_page.products {
                        if let Some(product) = normalize_product(raw) {
                            records.push(product);
                        }
                    }
                    self.progress.mark_completed(page);
                }
                Ok(Err(exhausted)) => {
                    tracing::error!("{}", exhausted);
                    self.progress.record_failure(page);
                }
                Err(join_error) => {
                    tracing::error!("Fetch task for page {} aborted: {}", page, join_error);
                    self.progress.record_failure(page);
                }
            }
        }

        self.progress.add_records(records.len() as u64);

        if !records.is_empty() {
            let appended = self.sink.append_records(&records)?;
            tracing::debug!("Persisted {} records", appended);
        }

        Ok(())
    }

    /// Emits the per-batch progress line
    fn log_progress(&self, total_pages: u32, started: Instant) {
        let completed = self.progress.completed_count();
        let fraction = if total_pages > 0 {
            completed as f64 / total_pages as f64 * 100.0
        } else {
            0.0
        };

        let elapsed = started.elapsed().as_secs_f64();
        let throughput = if elapsed > 0.0 {
            completed as f64 / elapsed
        } else {
            0.0
        };
        let eta_secs = if throughput > 0.0 {
            (total_pages as f64 - completed as f64) / throughput
        } else {
            0.0
        };

        tracing::info!(
            "Progress: {:.2}% | Records: {}/{} | Pages: {}/{} | Failed: {} | {:.2} pages/sec | ETA: {}m {}s",
            fraction,
            self.progress.scraped_count(),
            self.progress.total_units(),
            completed,
            total_pages,
            self.progress.failed_count(),
            throughput,
            (eta_secs / 60.0) as u64,
            (eta_secs % 60.0) as u64
        );
    }

    /// Saves a checkpoint, logging instead of raising on failure
    ///
    /// Checkpointing is best-effort durability: a failed save costs at most
    /// the redo work since the last successful one.
    fn flush_checkpoint(&self) {
        let snapshot = self.progress.to_snapshot(&self.config_hash);
        if let Err(e) = self.store.save(&snapshot) {
            tracing::error!("Failed to save checkpoint: {}", e);
        }
    }

    /// Settles the final outcome and clears the checkpoint on full success
    fn finish(&mut self, total_pages: u32, elapsed: Duration) -> Result<HarvestReport> {
        let failed_pages = self.progress.failed_pages();
        let completed_pages = self.progress.completed_count();
        let fully_complete =
            failed_pages.is_empty() && completed_pages as u32 == total_pages;

        let outcome = if fully_complete {
            match self.store.clear() {
                Ok(()) => tracing::info!("Checkpoint file cleared"),
                Err(e) => tracing::error!("Failed to clear checkpoint: {}", e),
            }
            RunOutcome::Success
        } else {
            RunOutcome::Partial
        };

        tracing::info!(
            "Harvest finished ({:?}): {} records, {}/{} pages, {} failed, {:?} elapsed",
            outcome,
            self.progress.scraped_count(),
            completed_pages,
            total_pages,
            failed_pages.len(),
            elapsed
        );

        Ok(HarvestReport {
            outcome,
            total_pages,
            completed_pages,
            scraped_count: self.progress.scraped_count(),
            failed_pages,
            elapsed,
        })
    }

    fn set_phase(&mut self, phase: RunPhase) {
        tracing::debug!("Run phase: {} -> {}", self.phase, phase);
        self.phase = phase;
    }
}
