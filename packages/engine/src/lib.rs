// packages/engine/src/lib.rs
//! Batchlog Engine Library
//!
//! In-process log batching: many producers emit events without blocking,
//! a bounded queue buffers them, and one background worker hands batches
//! to a pluggable sink.
//!
//! # Architecture
//!
//! ```text
//! producer ─▶ Engine::emit ─▶ level filter ─▶ EventQueue ┄┄▶ BatchWorker ─▶ Sink::write
//!                                                 │              ▲
//!                                            DropCounter ────────┘
//! ```
//!
//! - **event**: immutable events, levels, opaque scopes
//! - **filter**: longest-prefix category threshold resolution
//! - **queue**: lock-free bounded queue and drop accounting
//! - **worker**: the drain/deliver loop and its shutdown protocol
//! - **sink**: the sink contract plus console, file and in-memory sinks
//! - **engine**: the façade producers call, and category loggers
//! - **observability**: tracing setup and counter names
//! - **utils**: configuration and errors

pub mod engine;
pub mod event;
pub mod filter;
pub mod observability;
pub mod queue;
pub mod sink;
pub mod utils;
pub mod worker;

// Re-export commonly used types
pub use engine::{Engine, EngineStats, Logger, ShutdownOutcome};
pub use event::{ErrorPayload, Event, EventId, Level, Scope, ScopeStack};
pub use filter::LevelConfiguration;
pub use sink::{Batch, Sink};
pub use utils::config::{EngineConfig, SharedConfig};
pub use utils::errors::{EngineError, Result};
pub use worker::WorkerState;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
