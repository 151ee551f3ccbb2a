//! Admission gate bounding simultaneous outstanding fetches
//!
//! The gate is the sole admission-control primitive in the harvester. A pass
//! is held for the entire lifetime of one page's attempt sequence, including
//! backoff sleeps, so a page stuck in retry cannot consume extra upstream
//! capacity while others queue behind the gate.

use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Concurrency-limiting gate over fetch dispatch
#[derive(Clone)]
pub struct AdmissionGate {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

/// A held gate slot; dropping it releases the slot
pub struct GatePass {
    _permit: OwnedSemaphorePermit,
}

impl AdmissionGate {
    /// Creates a gate with `capacity` slots
    pub fn new(capacity: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Suspends the calling task until a slot is free, then claims it
    pub async fn admit(&self) -> GatePass {
        // The semaphore is never closed, so acquisition can only fail if the
        // gate itself was dropped while waiting.
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .expect("admission gate semaphore closed");
        GatePass { _permit: permit }
    }

    /// Configured slot count
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots currently free
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}
