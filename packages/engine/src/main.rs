// packages/engine/src/main.rs
//! Batchlog demo
//!
//! Runs an engine named `console` against the console sink, with a few
//! concurrent producers, then shuts down gracefully.

use anyhow::Result;
use batchlog_engine::observability::init_tracing;
use batchlog_engine::sink::ConsoleSink;
use batchlog_engine::{Engine, EngineConfig, Level};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

const PRODUCERS: usize = 4;
const EVENTS_PER_PRODUCER: usize = 25;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;

    info!("Starting Batchlog demo v{}", batchlog_engine::VERSION);

    let config = EngineConfig::load()?;
    info!("Configuration loaded: {:?}", config);

    let engine = Engine::new("console", config, Arc::new(ConsoleSink::default()));
    engine.start()?;

    let mut producers = Vec::with_capacity(PRODUCERS);
    for id in 0..PRODUCERS {
        let logger = engine.logger(format!("Demo.Producer{}", id));
        producers.push(tokio::spawn(async move {
            for n in 0..EVENTS_PER_PRODUCER {
                // Scopes live on the thread, so keep the guard out of any await
                {
                    let _scope = logger.begin_scope(format!("producer-{}", id));
                    let level = if n % 10 == 9 { Level::Warning } else { Level::Information };
                    logger.log(level, n as i32, None, || format!("event {} from producer {}", n, id));
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        }));
    }

    let work = async {
        for producer in producers {
            producer.await?;
        }
        anyhow::Ok(())
    };

    tokio::select! {
        result = work => result?,
        _ = tokio::signal::ctrl_c() => info!("Received shutdown signal, cleaning up..."),
    }

    let outcome = engine.shutdown().await;
    let stats = engine.stats();
    info!(
        "Shutdown {:?}: {} events in {} batches, {} dropped",
        outcome, stats.events_written, stats.batches_written, stats.total_drops
    );

    Ok(())
}
