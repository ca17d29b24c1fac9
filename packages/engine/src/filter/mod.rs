// packages/engine/src/filter/mod.rs
//! Severity filtering by category

pub mod level_resolver;

pub use level_resolver::{is_enabled, resolve, LevelConfiguration, BASELINE_LEVEL, DEFAULT_KEY};
