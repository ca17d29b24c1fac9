// packages/engine/src/queue/mod.rs
//! Producer/consumer buffering
//!
//! - **EventQueue**: lock-free queue with optional capacity, many producers,
//!   one consumer
//! - **DropCounter**: events rejected since the last drain
//!
//! ```text
//! producers ─try_enqueue─▶ EventQueue ─drain(n)─▶ BatchWorker
//!     │ (rejected)                                   ▲
//!     └──increment──▶ DropCounter ───take()──────────┘
//! ```

pub mod drop_counter;
pub mod event_queue;

pub use drop_counter::DropCounter;
pub use event_queue::{EventQueue, QueueStats, TryEnqueueError};
