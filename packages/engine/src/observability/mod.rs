// packages/engine/src/observability/mod.rs
//! Diagnostics for the engine itself
//!
//! The engine reports its own lifecycle through `tracing` and counts
//! drops, delivered batches and sink failures through the `metrics` facade.
//! Neither ever feeds back into an engine's own event stream.

use crate::utils::errors::{EngineError, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable selecting `json` or `text` diagnostics output
pub const LOG_FORMAT_ENV: &str = "BATCHLOG_LOG_FORMAT";

/// Counter names emitted by the batch worker
pub mod counters {
    pub const EVENTS_DROPPED: &str = "batchlog_events_dropped_total";
    pub const BATCHES_WRITTEN: &str = "batchlog_batches_written_total";
    pub const SINK_FAILURES: &str = "batchlog_sink_failures_total";
}

/// Install a global `tracing` subscriber
///
/// Filtering follows `RUST_LOG` (default `info`).
pub fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var(LOG_FORMAT_ENV)
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let installed = if json {
        fmt().with_env_filter(filter).json().try_init()
    } else {
        fmt().with_env_filter(filter).with_target(true).try_init()
    };

    installed.map_err(|e| EngineError::ConfigError(format!("Failed to install tracing subscriber: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_fails_cleanly() {
        let _ = init_tracing();
        assert!(init_tracing().is_err());
    }
}
