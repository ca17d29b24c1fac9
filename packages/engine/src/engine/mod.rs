// packages/engine/src/engine/mod.rs
//! Public entry point
//!
//! ```text
//! Logger ─▶ Engine::emit ─▶ is_enabled? ─▶ EventQueue::try_enqueue
//!                               │ no              │ rejected
//!                               ▼                 ▼
//!                            (return)        DropCounter
//! ```
//!
//! The engine owns the queue, the drop counter, the configuration handle and
//! the batch worker's lifecycle.

pub mod facade;
pub mod logger;

pub use facade::{Engine, EngineStats, ShutdownOutcome};
pub use logger::Logger;
