// src/source/gate.rs
//! Bounds how many page enrichments run at once.

use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;

/// A counting gate over a semaphore with `capacity` permits.
///
/// Acquisition order is not guaranteed to be FIFO.
#[derive(Debug, Clone)]
pub struct ConcurrencyGate {
    permits: Arc<Semaphore>,
    capacity: usize,
}

/// One slot of the gate, given back when dropped.
#[derive(Debug)]
pub struct GatePermit {
    _permit: OwnedSemaphorePermit,
}

impl ConcurrencyGate {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.clamp(1, Semaphore::MAX_PERMITS);
        Self {
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Waits for a free slot, or returns `None` once `cancel` fires.
    pub async fn enter(&self, cancel: &CancellationToken) -> Option<GatePermit> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            permit = Arc::clone(&self.permits).acquire_owned() => {
                permit.ok().map(|permit| GatePermit { _permit: permit })
            }
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots currently held.
    pub fn in_flight(&self) -> usize {
        self.capacity - self.permits.available_permits()
    }
}
