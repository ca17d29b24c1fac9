// packages/engine/tests/engine_integration.rs
//! End-to-end engine behavior through the public API

use batchlog_engine::sink::MemorySink;
use batchlog_engine::utils::config::ProviderConfig;
use batchlog_engine::{
    Engine, EngineConfig, EventId, Level, LevelConfiguration, ShutdownOutcome, WorkerState,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

fn provider(size: Option<usize>) -> ProviderConfig {
    ProviderConfig {
        size,
        ..Default::default()
    }
}

fn emit(engine: &Engine, category: &str, level: Level, message: String) {
    engine.emit(category, level, EventId::default(), || message, None, &[]);
}

#[tokio::test]
async fn shutdown_delivers_everything_buffered() {
    let sink = Arc::new(MemorySink::new());
    let config = EngineConfig::default()
        .with_batch(7)
        .with_interval_ms(60_000)
        .with_timeout_ms(5_000);
    let engine = Engine::new("app", config, sink.clone());
    engine.start().unwrap();

    // Let the worker settle into its long idle wait
    tokio::time::sleep(Duration::from_millis(50)).await;
    for i in 0..100 {
        emit(&engine, "App", Level::Information, format!("evt_{}", i));
    }

    assert_eq!(engine.shutdown().await, ShutdownOutcome::Completed);

    let messages: Vec<String> = sink
        .events()
        .iter()
        .filter_map(|e| e.message().map(str::to_string))
        .collect();
    let expected: Vec<String> = (0..100).map(|i| format!("evt_{}", i)).collect();
    assert_eq!(messages, expected);
    assert!(sink.batches().iter().all(|b| b.len() <= 7));
    assert_eq!(engine.worker_state(), WorkerState::Stopped);
}

#[tokio::test]
async fn shutdown_returns_after_timeout_with_slow_sink() {
    let sink = Arc::new(MemorySink::new().with_delay(Duration::from_secs(3)));
    let config = EngineConfig::default().with_timeout_ms(200);
    let engine = Engine::new("slow", config, sink.clone());
    engine.start().unwrap();

    emit(&engine, "App", Level::Warning, "stuck".to_string());

    // Wait for the write to be in flight
    let deadline = Instant::now() + Duration::from_secs(2);
    while sink.attempts() == 0 && Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(sink.attempts(), 1);

    let started = Instant::now();
    let outcome = engine.shutdown().await;
    let elapsed = started.elapsed();

    assert_eq!(outcome, ShutdownOutcome::TimedOut);
    assert!(elapsed >= Duration::from_millis(200));
    assert!(elapsed < Duration::from_secs(2));
    assert_eq!(sink.event_count(), 0);
}

#[tokio::test]
async fn drops_are_announced_once_in_the_next_batch() {
    let sink = Arc::new(MemorySink::new());
    let config = EngineConfig::default().with_provider("bounded", provider(Some(5)));
    let engine = Engine::new("bounded", config, sink.clone());

    for i in 0..20 {
        emit(&engine, "App", Level::Information, format!("evt_{}", i));
    }
    assert_eq!(engine.stats().pending_drops, 15);

    engine.start().unwrap();
    assert!(sink.wait_for_events(6, Duration::from_secs(2)).await);

    let batches = sink.batches();
    assert_eq!(batches.len(), 1);

    let events = batches[0].events();
    assert_eq!(events.len(), 6);
    let notice = &events[5];
    assert_eq!(notice.level(), Level::Warning);
    assert_eq!(notice.category(), "batchlog.bounded");
    assert_eq!(
        notice.message(),
        Some("15 message(s) dropped because of queue size limit")
    );

    let stats = engine.stats();
    assert_eq!(stats.pending_drops, 0);
    assert_eq!(stats.total_drops, 15);

    engine.shutdown().await;
    let notices = sink
        .events()
        .iter()
        .filter(|e| e.category() == "batchlog.bounded")
        .count();
    assert_eq!(notices, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_producers_never_exceed_capacity() {
    let sink = Arc::new(MemorySink::new().with_delay(Duration::from_millis(20)));
    let config = EngineConfig::default()
        .with_provider("busy", provider(Some(64)))
        .with_batch(16)
        .with_interval_ms(10);
    let engine = Engine::new("busy", config, sink.clone());
    engine.start().unwrap();

    let producers: Vec<_> = (0..8)
        .map(|p| {
            let engine = engine.clone();
            tokio::task::spawn_blocking(move || {
                for i in 0..500 {
                    emit(&engine, &format!("P{}", p), Level::Information, format!("{}", i));
                    assert!(engine.stats().queue.current_size <= 64);
                }
            })
        })
        .collect();
    for producer in producers {
        producer.await.unwrap();
    }

    engine.shutdown().await;

    let events = sink.events();
    let delivered = events
        .iter()
        .filter(|e| !e.category().starts_with("batchlog."))
        .count() as u64;
    let announced: u64 = events
        .iter()
        .filter(|e| e.category().starts_with("batchlog."))
        .filter_map(|e| e.message())
        .map(|m| m.split(' ').next().unwrap().parse::<u64>().unwrap())
        .sum();

    // Every event is either delivered or counted as dropped
    assert_eq!(delivered + engine.stats().total_drops, 4000);
    assert_eq!(announced, engine.stats().total_drops);

    // Each producer's events keep their relative order
    for p in 0..8 {
        let category = format!("P{}", p);
        let seq: Vec<u64> = events
            .iter()
            .filter(|e| e.category() == category)
            .map(|e| e.message().unwrap().parse().unwrap())
            .collect();
        assert!(seq.windows(2).all(|w| w[0] < w[1]));
    }
}

#[tokio::test]
async fn persistent_sink_failure_drops_batches_silently() {
    let sink = Arc::new(MemorySink::new());
    sink.set_failing(true);
    let config = EngineConfig::default().with_batch(2).with_interval_ms(10);
    let engine = Engine::new("failing", config, sink.clone());
    engine.start().unwrap();

    for i in 0..6 {
        emit(&engine, "App", Level::Error, format!("evt_{}", i));
    }

    assert_eq!(engine.shutdown().await, ShutdownOutcome::Completed);
    assert_eq!(sink.event_count(), 0);
    assert_eq!(sink.attempts(), 3);
    assert_eq!(engine.stats().sink_failures, 3);
}

#[tokio::test]
async fn lazy_message_never_rendered_below_threshold() {
    let config = EngineConfig::default()
        .with_global_levels(LevelConfiguration::new().with("Default", Level::Warning));
    let engine = Engine::new("lazy", config, Arc::new(MemorySink::new()));
    let rendered = Arc::new(AtomicUsize::new(0));

    let logger = engine.logger("App.Hot.Path");
    for _ in 0..1000 {
        let rendered = Arc::clone(&rendered);
        logger.debug(move || {
            rendered.fetch_add(1, Ordering::SeqCst);
            "expensive".to_string()
        });
    }

    assert_eq!(rendered.load(Ordering::SeqCst), 0);
    assert_eq!(engine.stats().queue.push_count, 0);
}

#[tokio::test]
async fn thresholds_from_toml_follow_precedence() {
    let config = EngineConfig::from_toml_str(
        r#"
        [logging.log_level]
        Default = "Critical"
        "App.Module.Sub" = "Trace"

        [logging.providers.console.log_level]
        "App.Module" = "Error"
        Default = "Trace"
        "#,
    )
    .unwrap();
    let engine = Engine::new("console", config, Arc::new(MemorySink::new()));

    // Provider tier matches first, even though the global tier is more specific
    assert!(!engine.is_enabled("App.Module.Sub", Level::Warning));
    assert!(engine.is_enabled("App.Module.Sub", Level::Error));
    assert!(engine.is_enabled("Other", Level::Trace));

    // Another engine name only sees the global tier
    let other = Engine::new("file", engine.config().clone(), Arc::new(MemorySink::new()));
    assert!(other.is_enabled("App.Module.Sub", Level::Trace));
    assert!(!other.is_enabled("Other", Level::Error));
}

#[tokio::test]
async fn emits_after_shutdown_are_ignored() {
    let sink = Arc::new(MemorySink::new());
    let engine = Engine::new("closed", EngineConfig::default(), sink.clone());
    engine.start().unwrap();
    engine.shutdown().await;

    emit(&engine, "App", Level::Critical, "too late".to_string());

    assert_eq!(sink.event_count(), 0);
    assert_eq!(engine.stats().queue.push_count, 0);
}

#[tokio::test]
async fn dropping_engine_lets_worker_flush() {
    let sink = Arc::new(MemorySink::new());
    let config = EngineConfig::default().with_interval_ms(60_000);
    {
        let engine = Engine::new("dropped", config, sink.clone());
        engine.start().unwrap();
        for i in 0..3 {
            emit(&engine, "App", Level::Information, format!("evt_{}", i));
        }
    }

    assert!(sink.wait_for_events(3, Duration::from_secs(2)).await);
}
