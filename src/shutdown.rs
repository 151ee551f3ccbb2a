//! Cooperative shutdown signal
//!
//! A single process-wide flag set from an external termination request and
//! read by the orchestrator only at batch boundaries. It never interrupts a
//! fetch in flight or a backoff sleep already in progress, so every page in a
//! started batch reaches a terminal state before the run stops and the
//! persisted checkpoint stays internally consistent.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Clone-able handle to the shutdown flag
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    flag: Arc<AtomicBool>,
}

impl ShutdownSignal {
    /// Creates a new, unset signal
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests a cooperative stop
    pub fn request_stop(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Returns true once a stop has been requested
    pub fn is_set(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Wires Ctrl-C to this signal
    ///
    /// Spawns a background task; the run keeps going until the orchestrator
    /// next checks the flag at a batch boundary.
    pub fn listen_for_ctrl_c(&self) {
        let signal = self.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for Ctrl-C: {}", e);
                return;
            }
            tracing::warn!("Received Ctrl-C. Initiating graceful shutdown...");
            signal.request_stop();
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_unset() {
        let signal = ShutdownSignal::new();
        assert!(!signal.is_set());
    }

    #[test]
    fn test_request_stop_sets_flag() {
        let signal = ShutdownSignal::new();
        signal.request_stop();
        assert!(signal.is_set());
    }

    #[test]
    fn test_clones_share_the_flag() {
        let signal = ShutdownSignal::new();
        let clone = signal.clone();

        clone.request_stop();
        assert!(signal.is_set());
    }
}
