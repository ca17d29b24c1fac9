// packages/engine/src/utils/mod.rs
//! Common utilities: configuration and error types

pub mod config;
pub mod errors;

pub use config::{EngineConfig, LoggingConfig, ProviderConfig, SharedConfig};
pub use errors::{EngineError, Result};
