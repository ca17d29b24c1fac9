// packages/engine/src/sink/mod.rs
//! Batch sinks
//!
//! A [`Sink`] receives whole batches from the batch worker and performs the
//! actual write. Serialization is entirely the sink's business; the engine
//! defines no wire format.
//!
//! - **ConsoleSink**: human-readable or JSON lines on stdout
//! - **FileSink**: JSON lines appended to a file
//! - **MemorySink**: keeps batches in memory
//! - **EventRecord**: serde view of an event shared by the bundled sinks

pub mod console;
pub mod file;
pub mod memory;
pub mod record;

pub use console::{ConsoleFormat, ConsoleSink};
pub use file::FileSink;
pub use memory::MemorySink;
pub use record::EventRecord;

use crate::event::Event;
use crate::utils::errors::Result;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Events collected during one drain cycle
///
/// Ownership passes to the sink; the engine keeps nothing.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    events: Vec<Event>,
}

impl Batch {
    pub fn new(events: Vec<Event>) -> Self {
        Self { events }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Event> {
        self.events.iter()
    }
}

impl IntoIterator for Batch {
    type Item = Event;
    type IntoIter = std::vec::IntoIter<Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter()
    }
}

impl<'a> IntoIterator for &'a Batch {
    type Item = &'a Event;
    type IntoIter = std::slice::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

/// Destination for batches
///
/// Each batch is offered exactly once. Errors (and panics) are swallowed by
/// the worker and the batch is lost. `cancel` fires when shutdown gives up
/// waiting; honoring it is optional.
#[async_trait]
pub trait Sink: Send + Sync + 'static {
    async fn write(&self, batch: Batch, cancel: CancellationToken) -> Result<()>;
}
