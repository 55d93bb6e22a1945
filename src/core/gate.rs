//! Bounded, non-blocking admission control in front of the pipeline.

use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

#[derive(Debug, Clone)]
pub struct Gate {
    permits: Arc<Semaphore>,
    capacity: usize,
}

/// One unit of the gate's allowance. Dropping it returns the slot.
#[derive(Debug)]
pub struct GatePermit {
    _permit: OwnedSemaphorePermit,
}

impl Gate {
    pub fn new(capacity: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Returns immediately; `None` means every slot is taken and the caller should shed the request.
    pub fn try_acquire(&self) -> Option<GatePermit> {
        self.permits
            .clone()
            .try_acquire_owned()
            .ok()
            .map(|permit| GatePermit { _permit: permit })
    }

    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
