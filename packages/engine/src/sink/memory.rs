// packages/engine/src/sink/memory.rs
//! In-memory sink for tests and embedding

use crate::event::Event;
use crate::sink::{Batch, Sink};
use crate::utils::errors::{EngineError, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

/// Keeps every delivered batch in memory
///
/// Can be slowed down or switched into a failing mode to exercise the
/// worker's failure handling.
#[derive(Default)]
pub struct MemorySink {
    batches: Mutex<Vec<Batch>>,
    delay: Option<Duration>,
    failing: AtomicBool,
    attempts: AtomicU64,
    delivered: Notify,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
    
    /// Sleep this long inside every write, ignoring cancellation
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
    
    /// Reject subsequent writes
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
    
    /// Write calls, successful or not
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::SeqCst)
    }
    
    pub fn batches(&self) -> Vec<Batch> {
        self.batches.lock().clone()
    }
    
    /// All delivered events in delivery order
    pub fn events(&self) -> Vec<Event> {
        self.batches
            .lock()
            .iter()
            .flat_map(|batch| batch.events().iter().cloned())
            .collect()
    }
    
    pub fn event_count(&self) -> usize {
        self.batches.lock().iter().map(Batch::len).sum()
    }
    
    /// Wait until at least `count` events were delivered or `timeout` passes
    pub async fn wait_for_events(&self, count: usize, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        
        loop {
            let delivered = self.delivered.notified();
            if self.event_count() >= count {
                return true;
            }
            if tokio::time::timeout_at(deadline, delivered).await.is_err() {
                return self.event_count() >= count;
            }
        }
    }
}

#[async_trait]
impl Sink for MemorySink {
    async fn write(&self, batch: Batch, _cancel: CancellationToken) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        
        if self.failing.load(Ordering::SeqCst) {
            return Err(EngineError::SinkFailed("memory sink set to fail".to_string()));
        }
        
        self.batches.lock().push(batch);
        self.delivered.notify_waiters();
        Ok(())
    }
}
