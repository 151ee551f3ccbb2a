//! Durable checkpoint snapshots for crash-safe resume
//!
//! The checkpoint is a single JSON document overwritten wholesale on each
//! save. A missing or unreadable checkpoint is treated as a fresh start, never
//! as a fatal condition; the file is removed only once a run finishes with
//! every page completed and no residual failures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during checkpoint operations
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("Failed to serialize checkpoint: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for checkpoint operations
pub type CheckpointResult<T> = Result<T, CheckpointError>;

/// Persisted progress of a harvest run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Pages whose records reached the sink
    pub completed_pages: Vec<u32>,

    /// Pages that exhausted their retry budget
    pub failed_pages: Vec<u32>,

    /// Count of successfully normalized records (not pages)
    pub scraped_count: u64,

    /// Total catalog items reported by the source
    pub total_units: u64,

    /// When this snapshot was written
    pub saved_at: DateTime<Utc>,

    /// Hash of the configuration that produced this snapshot
    #[serde(default)]
    pub config_hash: String,
}

/// File-backed checkpoint storage
///
/// Saves overwrite the previous snapshot wholesale; durability is best-effort
/// and the orchestrator owns the log-and-continue policy on failure.
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    /// Creates a store backed by the given file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the checkpoint file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serializes the snapshot, overwriting any prior persisted snapshot
    pub fn save(&self, snapshot: &Snapshot) -> CheckpointResult<()> {
        let json = serde_json::to_string_pretty(snapshot)?;
        std::fs::write(&self.path, json)?;
        tracing::debug!(
            "Checkpoint saved: {} pages completed, {} failed",
            snapshot.completed_pages.len(),
            snapshot.failed_pages.len()
        );
        Ok(())
    }

    /// Loads the persisted snapshot, if a usable one exists
    ///
    /// An absent, unreadable, or corrupt file yields `None`: the caller
    /// starts fresh.
    pub fn load(&self) -> Option<Snapshot> {
        if !self.path.exists() {
            tracing::info!("No checkpoint found at {}", self.path.display());
            return None;
        }

        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(
                    "Failed to read checkpoint {}: {}. Starting fresh.",
                    self.path.display(),
                    e
                );
                return None;
            }
        };

        match serde_json::from_str::<Snapshot>(&content) {
            Ok(snapshot) => {
                tracing::info!(
                    "Checkpoint loaded: {} pages already completed (saved at {})",
                    snapshot.completed_pages.len(),
                    snapshot.saved_at
                );
                Some(snapshot)
            }
            Err(e) => {
                tracing::warn!(
                    "Checkpoint {} is corrupt: {}. Starting fresh.",
                    self.path.display(),
                    e
                );
                None
            }
        }
    }

    /// Removes the persisted snapshot
    ///
    /// Only invoked after the orchestrator confirms full success. Removing an
    /// already-absent file is not an error.
    pub fn clear(&self) -> CheckpointResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_snapshot() -> Snapshot {
        Snapshot {
            completed_pages: vec![1, 2, 3],
            failed_pages: vec![7],
            scraped_count: 72,
            total_units: 1000,
            saved_at: Utc::now(),
            config_hash: "deadbeef".to_string(),
        }
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempdir().unwrap();
        let store = CheckpointStore::new(dir.path().join("checkpoint.json"));

        store.save(&sample_snapshot()).unwrap();

        let loaded = store.load().expect("snapshot should load");
        assert_eq!(loaded.completed_pages, vec![1, 2, 3]);
        assert_eq!(loaded.failed_pages, vec![7]);
        assert_eq!(loaded.scraped_count, 72);
        assert_eq!(loaded.total_units, 1000);
        assert_eq!(loaded.config_hash, "deadbeef");
    }

    #[test]
    fn test_load_absent_file_returns_none() {
        let dir = tempdir().unwrap();
        let store = CheckpointStore::new(dir.path().join("missing.json"));
        assert!(store.load().is_none());
    }

    #[test]
    fn test_load_corrupt_file_returns_none() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("checkpoint.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = CheckpointStore::new(path);
        assert!(store.load().is_none());
    }

    #[test]
    fn test_save_overwrites_wholesale() {
        let dir = tempdir().unwrap();
        let store = CheckpointStore::new(dir.path().join("checkpoint.json"));

        store.save(&sample_snapshot()).unwrap();

        let mut second = sample_snapshot();
        second.completed_pages = vec![1];
        second.failed_pages = vec![];
        store.save(&second).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.completed_pages, vec![1]);
        assert!(loaded.failed_pages.is_empty());
    }

    #[test]
    fn test_clear_removes_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("checkpoint.json");
        let store = CheckpointStore::new(path.clone());

        store.save(&sample_snapshot()).unwrap();
        assert!(path.exists());

        store.clear().unwrap();
        assert!(!path.exists());

        // Clearing again is a no-op
        store.clear().unwrap();
    }

    #[test]
    fn test_snapshot_without_config_hash_still_loads() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("checkpoint.json");
        std::fs::write(
            &path,
            r#"{
                "completed_pages": [1],
                "failed_pages": [],
                "scraped_count": 24,
                "total_units": 48,
                "saved_at": "2026-01-01T00:00:00Z"
            }"#,
        )
        .unwrap();

        let store = CheckpointStore::new(path);
        let loaded = store.load().expect("snapshot should load");
        assert_eq!(loaded.completed_pages, vec![1]);
        assert!(loaded.config_hash.is_empty());
    }
}
