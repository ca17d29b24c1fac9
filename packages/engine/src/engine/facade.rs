// packages/engine/src/engine/facade.rs
//! Engine façade
//!
//! Producers call [`Engine::emit`] (directly or through a [`Logger`]); the
//! engine filters by level, builds the event and offers it to the queue
//! without ever blocking. A single background [`BatchWorker`] delivers
//! batches to the sink.

use crate::engine::logger::Logger;
use crate::event::{ErrorPayload, Event, EventId, Level, Scope};
use crate::filter;
use crate::queue::{DropCounter, EventQueue, QueueStats};
use crate::sink::Sink;
use crate::utils::config::SharedConfig;
use crate::utils::errors::{EngineError, Result};
use crate::worker::{BatchWorker, WorkerState, WorkerStatus};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// How a call to [`Engine::shutdown`] ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// The worker flushed and exited within the timeout
    Completed,
    
    /// The timeout elapsed; the worker was left running on its own
    TimedOut,
    
    /// The worker was never started, buffered events were discarded
    NotStarted,
    
    /// An earlier call already shut the engine down
    AlreadyShutDown,
}

/// Point-in-time engine statistics
#[derive(Debug, Clone)]
pub struct EngineStats {
    pub queue: QueueStats,
    pub pending_drops: u64,
    pub total_drops: u64,
    pub batches_written: u64,
    pub events_written: u64,
    pub sink_failures: u64,
    pub worker_state: WorkerState,
}

enum Lifecycle {
    Idle,
    Running(JoinHandle<()>),
    Stopped,
}

struct EngineInner {
    name: String,
    config: SharedConfig,
    queue: Arc<EventQueue>,
    drops: Arc<DropCounter>,
    sink: Arc<dyn Sink>,
    shutdown: CancellationToken,
    write_cancel: CancellationToken,
    status: Arc<WorkerStatus>,
    lifecycle: Mutex<Lifecycle>,
}

impl Drop for EngineInner {
    fn drop(&mut self) {
        // Let a running worker flush and exit on its own
        self.queue.complete_adding();
        self.shutdown.cancel();
    }
}

/// Log batching engine
///
/// Cheap to clone; all clones share one queue and one worker.
#[derive(Clone)]
pub struct Engine {
    inner: Arc<EngineInner>,
}

impl Engine {
    /// Build an engine named `name`
    ///
    /// The name selects the provider section of the configuration (queue
    /// size, scope capture, provider threshold tier). Queue capacity is read
    /// once, here; everything else is re-read on use.
    pub fn new(name: impl Into<String>, config: impl Into<SharedConfig>, sink: Arc<dyn Sink>) -> Self {
        let name = name.into();
        let config = config.into();
        let capacity = config.snapshot().queue_capacity(&name);
        
        debug!("Creating engine {} with queue capacity {:?}", name, capacity);
        
        Self {
            inner: Arc::new(EngineInner {
                name,
                config,
                queue: Arc::new(EventQueue::new(capacity)),
                drops: Arc::new(DropCounter::new()),
                sink,
                shutdown: CancellationToken::new(),
                write_cancel: CancellationToken::new(),
                status: Arc::new(WorkerStatus::default()),
                lifecycle: Mutex::new(Lifecycle::Idle),
            }),
        }
    }
    
    pub fn name(&self) -> &str {
        &self.inner.name
    }
    
    /// Configuration handle; replacing its contents reconfigures the engine
    pub fn config(&self) -> &SharedConfig {
        &self.inner.config
    }
    
    /// Logger bound to `category`
    pub fn logger(&self, category: impl Into<String>) -> Logger {
        Logger::new(self.clone(), category.into())
    }
    
    /// Spawn the batch worker on the current Tokio runtime
    ///
    /// Fails with [`EngineError::AlreadyStarted`] on a second call and with
    /// [`EngineError::ShutDown`] after shutdown; neither changes the engine.
    pub fn start(&self) -> Result<()> {
        let runtime = Handle::try_current().map_err(|_| EngineError::NoRuntime)?;
        
        let mut lifecycle = self.inner.lifecycle.lock();
        match *lifecycle {
            Lifecycle::Running(_) => return Err(EngineError::AlreadyStarted),
            Lifecycle::Stopped => return Err(EngineError::ShutDown),
            Lifecycle::Idle => {}
        }
        
        let worker = BatchWorker::new(
            &self.inner.name,
            Arc::clone(&self.inner.queue),
            Arc::clone(&self.inner.drops),
            self.inner.config.clone(),
            Arc::clone(&self.inner.sink),
            self.inner.shutdown.clone(),
            self.inner.write_cancel.clone(),
            Arc::clone(&self.inner.status),
        );
        *lifecycle = Lifecycle::Running(runtime.spawn(worker.run()));
        
        info!("Engine {} started", self.inner.name);
        Ok(())
    }
    
    /// Whether an event at `level` for `category` would be accepted
    pub fn is_enabled(&self, category: &str, level: Level) -> bool {
        let config = self.inner.config.snapshot();
        filter::is_enabled(category, level, &config.level_tiers(&self.inner.name))
    }
    
    /// Offer one event to the engine
    ///
    /// Returns immediately. `message` is only invoked when the level is
    /// enabled. A full or closed queue turns the event into a drop that is
    /// announced with the next batch.
    pub fn emit<F, M>(
        &self,
        category: &str,
        level: Level,
        event_id: EventId,
        message: F,
        error: Option<ErrorPayload>,
        scopes: &[Scope],
    ) where
        F: FnOnce() -> M,
        M: Into<Option<String>>,
    {
        self.emit_with(category, level, event_id, message, error, || scopes.to_vec());
    }
    
    /// Like [`Engine::emit`] but also captures scopes lazily
    pub(crate) fn emit_with<F, M, S>(
        &self,
        category: &str,
        level: Level,
        event_id: EventId,
        message: F,
        error: Option<ErrorPayload>,
        scopes: S,
    ) where
        F: FnOnce() -> M,
        M: Into<Option<String>>,
        S: FnOnce() -> Vec<Scope>,
    {
        let config = self.inner.config.snapshot();
        if !filter::is_enabled(category, level, &config.level_tiers(&self.inner.name)) {
            return;
        }
        
        let mut event = Event::new(category, level, event_id, message().into());
        if let Some(error) = error {
            event = event.with_error(error);
        }
        if config.include_scopes(&self.inner.name) {
            event = event.with_scopes(scopes());
        }
        
        if self.inner.queue.try_enqueue(event).is_err() {
            self.inner.drops.increment();
        }
    }
    
    /// Stop accepting events, flush, and wait for the worker
    ///
    /// The wait is bounded by the configured `timeout`. A worker still
    /// writing at the deadline is abandoned, not aborted: its sink sees the
    /// cancellation token fire and anything it has not written is lost.
    /// Only the first call has any effect.
    pub async fn shutdown(&self) -> ShutdownOutcome {
        let handle = {
            let mut lifecycle = self.inner.lifecycle.lock();
            match std::mem::replace(&mut *lifecycle, Lifecycle::Stopped) {
                Lifecycle::Stopped => return ShutdownOutcome::AlreadyShutDown,
                Lifecycle::Idle => None,
                Lifecycle::Running(handle) => Some(handle),
            }
        };
        
        info!("Shutting down engine {}", self.inner.name);
        
        self.inner.queue.complete_adding();
        self.inner.shutdown.cancel();
        
        let Some(handle) = handle else {
            let discarded = self.inner.queue.len();
            if discarded > 0 {
                warn!(
                    "Engine {} shut down before start, {} buffered events discarded",
                    self.inner.name, discarded
                );
            }
            return ShutdownOutcome::NotStarted;
        };
        
        let timeout = self.inner.config.snapshot().timeout();
        match tokio::time::timeout(timeout, handle).await {
            Ok(Ok(())) => {
                info!("Engine {} shut down", self.inner.name);
                ShutdownOutcome::Completed
            }
            Ok(Err(e)) => {
                warn!("Batch worker for {} ended abnormally: {}", self.inner.name, e);
                ShutdownOutcome::Completed
            }
            Err(_) => {
                warn!(
                    "Batch worker for {} still running after {:?}, abandoning it",
                    self.inner.name, timeout
                );
                self.inner.write_cancel.cancel();
                ShutdownOutcome::TimedOut
            }
        }
    }
    
    pub fn worker_state(&self) -> WorkerState {
        self.inner.status.state()
    }
    
    pub fn stats(&self) -> EngineStats {
        let status = &self.inner.status;
        EngineStats {
            queue: self.inner.queue.stats(),
            pending_drops: self.inner.drops.pending(),
            total_drops: self.inner.drops.total(),
            batches_written: status.batches_written(),
            events_written: status.events_written(),
            sink_failures: status.sink_failures(),
            worker_state: status.state(),
        }
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("name", &self.inner.name)
            .field("queue", &self.inner.queue)
            .field("worker_state", &self.worker_state())
            .finish()
    }
}
