//! Run bookkeeping: completed/failed page sets and counters
//!
//! All mutation happens on the orchestrator's control flow, strictly after a
//! batch barrier. Fetch tasks never touch this state.

use crate::checkpoint::Snapshot;
use crate::state::PageState;
use std::collections::BTreeSet;

/// Computes the number of pages needed to cover `total_units` catalog items
///
/// Ceiling division; computed once from the first successful fetch and treated
/// as immutable for the remainder of the run.
pub fn page_count(total_units: u64, per_page: u32) -> u32 {
    if per_page == 0 {
        return 0;
    }
    ((total_units + per_page as u64 - 1) / per_page as u64) as u32
}

/// In-memory progress of a harvest run
///
/// Maintains the invariant that a page number is never in both the completed
/// set and the failed list: completing a page removes it from the failed list,
/// and a failure is only recorded for pages not already completed.
#[derive(Debug, Clone, Default)]
pub struct HarvestProgress {
    /// Pages whose records were handed to the sink; monotonically growing
    completed: BTreeSet<u32>,

    /// Pages that exhausted their retry budget; deduplicated
    failed: Vec<u32>,

    /// Count of successfully normalized records (not pages)
    scraped_count: u64,

    /// Total catalog items reported by the source; 0 until discovered
    total_units: u64,
}

impl HarvestProgress {
    /// Creates empty progress for a fresh run
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds progress from a loaded checkpoint snapshot
    ///
    /// The failed list is sanitized against the completed set so that a
    /// checkpoint written by an older run can never reintroduce a page into
    /// both sets.
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let completed: BTreeSet<u32> = snapshot.completed_pages.iter().copied().collect();

        let mut failed = Vec::new();
        for &page in &snapshot.failed_pages {
            if !completed.contains(&page) && !failed.contains(&page) {
                failed.push(page);
            }
        }

        Self {
            completed,
            failed,
            scraped_count: snapshot.scraped_count,
            total_units: snapshot.total_units,
        }
    }

    /// Captures the current progress as a checkpoint snapshot
    pub fn to_snapshot(&self, config_hash: &str) -> Snapshot {
        Snapshot {
            completed_pages: self.completed.iter().copied().collect(),
            failed_pages: self.failed.clone(),
            scraped_count: self.scraped_count,
            total_units: self.total_units,
            saved_at: chrono::Utc::now(),
            config_hash: config_hash.to_string(),
        }
    }

    /// Records a page as completed
    ///
    /// Removes the page from the failed list if a previous phase recorded it
    /// there.
    pub fn mark_completed(&mut self, page: u32) {
        self.completed.insert(page);
        self.failed.retain(|&p| p != page);
    }

    /// Records a page as failed, unless it already completed
    ///
    /// Duplicate failures of the same page are recorded once.
    pub fn record_failure(&mut self, page: u32) {
        if !self.completed.contains(&page) && !self.failed.contains(&page) {
            self.failed.push(page);
        }
    }

    /// Adds normalized records to the scraped counter
    pub fn add_records(&mut self, count: u64) {
        self.scraped_count += count;
    }

    /// Sets the total unit count discovered from the source
    pub fn set_total_units(&mut self, total: u64) {
        self.total_units = total;
    }

    pub fn total_units(&self) -> u64 {
        self.total_units
    }

    pub fn scraped_count(&self) -> u64 {
        self.scraped_count
    }

    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    /// Returns true if the page's records already reached the sink
    pub fn is_completed(&self, page: u32) -> bool {
        self.completed.contains(&page)
    }

    /// Returns the bookkeeping state of a page
    ///
    /// InFlight is not observable here; it only exists inside a running batch.
    pub fn state_of(&self, page: u32) -> PageState {
        if self.completed.contains(&page) {
            PageState::Completed
        } else if self.failed.contains(&page) {
            PageState::Failed
        } else {
            PageState::Pending
        }
    }

    /// Pages from `pages` that still need fetching
    pub fn pending_pages(&self, pages: impl IntoIterator<Item = u32>) -> Vec<u32> {
        pages
            .into_iter()
            .filter(|p| !self.completed.contains(p))
            .collect()
    }

    /// Failed pages eligible for the drain pass, ascending
    ///
    /// Deduplicated against the completed set.
    pub fn drain_candidates(&self) -> Vec<u32> {
        let mut pages: Vec<u32> = self
            .failed
            .iter()
            .copied()
            .filter(|p| !self.completed.contains(p))
            .collect();
        pages.sort_unstable();
        pages.dedup();
        pages
    }

    /// Residual failed pages, ascending (for the final report)
    pub fn failed_pages(&self) -> Vec<u32> {
        self.drain_candidates()
    }
}
