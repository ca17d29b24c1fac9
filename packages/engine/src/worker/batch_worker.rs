// packages/engine/src/worker/batch_worker.rs
//! Background batch worker
//!
//! Drains the event queue in batches and forwards them to the sink. One
//! worker runs per engine.
//!
//! # State machine
//!
//! ```text
//!             ┌──────────── batch delivered ────────────┐
//!             ▼                                          │
//! Running ──▶ Draining ──(nothing to send)──▶ IdleWait ──┤ interval elapsed
//!   │                                            │       │
//!   └──────────── shutdown token ────────────────┴──▶ ShuttingDown ──▶ Stopped
//!                                                 (final flush)
//! ```

use crate::event::Event;
use crate::observability::counters;
use crate::queue::{DropCounter, EventQueue};
use crate::sink::{Batch, Sink};
use crate::utils::config::SharedConfig;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Prefix of the category used for drop notices
pub const DROP_NOTICE_CATEGORY_PREFIX: &str = "batchlog";

/// Worker lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WorkerState {
    NotStarted = 0,
    Running = 1,
    Draining = 2,
    IdleWait = 3,
    ShuttingDown = 4,
    Stopped = 5,
}

impl WorkerState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => WorkerState::Running,
            2 => WorkerState::Draining,
            3 => WorkerState::IdleWait,
            4 => WorkerState::ShuttingDown,
            5 => WorkerState::Stopped,
            _ => WorkerState::NotStarted,
        }
    }
}

/// Shared, observable worker state and counters
#[derive(Debug, Default)]
pub struct WorkerStatus {
    state: AtomicU8,
    batches_written: AtomicU64,
    events_written: AtomicU64,
    sink_failures: AtomicU64,
}

impl WorkerStatus {
    pub fn state(&self) -> WorkerState {
        WorkerState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn set_state(&self, state: WorkerState) {
        self.state.store(state as u8, Ordering::Release);
    }

    pub fn batches_written(&self) -> u64 {
        self.batches_written.load(Ordering::Relaxed)
    }

    pub fn events_written(&self) -> u64 {
        self.events_written.load(Ordering::Relaxed)
    }

    pub fn sink_failures(&self) -> u64 {
        self.sink_failures.load(Ordering::Relaxed)
    }
}

/// The drain/deliver loop
pub struct BatchWorker {
    notice_category: String,
    queue: Arc<EventQueue>,
    drops: Arc<DropCounter>,
    config: SharedConfig,
    sink: Arc<dyn Sink>,
    shutdown: CancellationToken,
    write_cancel: CancellationToken,
    status: Arc<WorkerStatus>,
}

impl BatchWorker {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: &str,
        queue: Arc<EventQueue>,
        drops: Arc<DropCounter>,
        config: SharedConfig,
        sink: Arc<dyn Sink>,
        shutdown: CancellationToken,
        write_cancel: CancellationToken,
        status: Arc<WorkerStatus>,
    ) -> Self {
        Self {
            notice_category: format!("{}.{}", DROP_NOTICE_CATEGORY_PREFIX, name),
            queue,
            drops,
            config,
            sink,
            shutdown,
            write_cancel,
            status,
        }
    }

    /// Run until the shutdown token fires, then flush what is left
    pub async fn run(self) {
        info!("Batch worker {} started", self.notice_category);

        self.status.set_state(WorkerState::Running);
        while !self.shutdown.is_cancelled() {
            self.status.set_state(WorkerState::Draining);
            if self.cycle().await {
                tokio::task::yield_now().await;
                continue;
            }

            self.status.set_state(WorkerState::IdleWait);
            let interval = self.config.snapshot().interval();
            tokio::select! {
                _ = self.shutdown.cancelled() => {}
                _ = tokio::time::sleep(interval) => {}
            }
            self.status.set_state(WorkerState::Running);
        }

        self.status.set_state(WorkerState::ShuttingDown);
        self.flush_remaining().await;
        self.status.set_state(WorkerState::Stopped);

        info!(
            "Batch worker {} stopped after {} batches",
            self.notice_category,
            self.status.batches_written()
        );
    }

    /// Deliver everything still buffered once adding has stopped
    async fn flush_remaining(&self) {
        self.queue.complete_adding();

        loop {
            let delivered = self.cycle().await;
            if self.queue.is_completed() {
                break;
            }
            if !delivered {
                // A producer reserved a slot but has not pushed yet
                tokio::task::yield_now().await;
            }
        }

        // Rejections that raced the close
        self.cycle().await;
    }

    /// One drain step; returns whether a batch was handed to the sink
    async fn cycle(&self) -> bool {
        let batch_size = self.config.snapshot().batch_size();
        let mut events = self.queue.drain(batch_size);

        let dropped = self.drops.take();
        if dropped > 0 {
            metrics::counter!(counters::EVENTS_DROPPED).increment(dropped);
            events.push(Event::dropped_notice(&self.notice_category, dropped));
        }

        if events.is_empty() {
            return false;
        }

        self.deliver(Batch::new(events)).await;
        true
    }

    /// Hand one batch to the sink; failures lose the batch
    async fn deliver(&self, batch: Batch) {
        let count = batch.len() as u64;
        let write = self.sink.write(batch, self.write_cancel.clone());

        match AssertUnwindSafe(write).catch_unwind().await {
            Ok(Ok(())) => {
                self.status.batches_written.fetch_add(1, Ordering::Relaxed);
                self.status.events_written.fetch_add(count, Ordering::Relaxed);
                metrics::counter!(counters::BATCHES_WRITTEN).increment(1);
                debug!("Delivered batch of {} events", count);
            }
            Ok(Err(e)) => {
                self.status.sink_failures.fetch_add(1, Ordering::Relaxed);
                metrics::counter!(counters::SINK_FAILURES).increment(1);
                debug!("Sink failed, batch of {} events lost: {}", count, e);
            }
            Err(_) => {
                self.status.sink_failures.fetch_add(1, Ordering::Relaxed);
                metrics::counter!(counters::SINK_FAILURES).increment(1);
                debug!("Sink panicked, batch of {} events lost", count);
            }
        }
    }
}
