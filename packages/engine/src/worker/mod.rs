// packages/engine/src/worker/mod.rs
//! Background delivery

pub mod batch_worker;

pub use batch_worker::{BatchWorker, WorkerState, WorkerStatus, DROP_NOTICE_CATEGORY_PREFIX};
