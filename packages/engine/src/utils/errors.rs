// packages/engine/src/utils/errors.rs
//! Error types for the batching engine
//!
//! Producers never see these: `Engine::emit` swallows every failure. They
//! surface from lifecycle calls, configuration loading and sink writes.

use thiserror::Error;

/// Engine error
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration could not be loaded or failed validation
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// `start` was called on an engine whose worker is already running
    #[error("Batch worker already started")]
    AlreadyStarted,

    /// The engine has been shut down
    #[error("Engine has been shut down")]
    ShutDown,

    /// `start` was called outside of a Tokio runtime
    #[error("No Tokio runtime available to spawn the batch worker")]
    NoRuntime,

    /// A sink failed to write a batch
    #[error("Sink write failed: {0}")]
    SinkFailed(String),

    /// I/O error raised by a sink
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Event serialization error raised by a sink
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<config::ConfigError> for EngineError {
    fn from(err: config::ConfigError) -> Self {
        EngineError::ConfigError(err.to_string())
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, EngineError>;
