// packages/engine/src/queue/drop_counter.rs
//! Aggregate count of events lost to admission failures

use std::sync::atomic::{AtomicU64, Ordering};

/// Per-engine drop counter
///
/// Producers bump it on every rejected enqueue; the batch worker takes and
/// zeroes it once per drain cycle.
#[derive(Debug, Default)]
pub struct DropCounter {
    pending: AtomicU64,
    total: AtomicU64,
}

impl DropCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&self) {
        self.pending.fetch_add(1, Ordering::AcqRel);
        self.total.fetch_add(1, Ordering::Relaxed);
    }

    /// Read and reset the pending count atomically
    pub fn take(&self) -> u64 {
        self.pending.swap(0, Ordering::AcqRel)
    }

    /// Drops not yet announced
    pub fn pending(&self) -> u64 {
        self.pending.load(Ordering::Acquire)
    }

    /// Drops since the engine was created
    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }
}
