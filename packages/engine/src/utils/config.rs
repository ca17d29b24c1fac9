// packages/engine/src/utils/config.rs
//! Engine configuration
//!
//! Loaded from an optional file plus `BATCHLOG_*` environment overrides
//! (nested keys separated by `__`, e.g. `BATCHLOG_LOGGING__PROVIDERS__CONSOLE__SIZE`):
//!
//! ```toml
//! batch = 500
//! interval = 5000
//! timeout = 5000
//!
//! [logging.log_level]
//! Default = "Information"
//!
//! [logging.providers.console]
//! size = 1000
//! include_scopes = true
//!
//! [logging.providers.console.log_level]
//! "App.Module" = "Error"
//! ```
//!
//! Values are read through [`SharedConfig`] snapshots so a reload is picked
//! up by the next emit or worker cycle.

use crate::filter::LevelConfiguration;
use crate::utils::errors::{EngineError, Result};
use config::{Config, Environment, File, FileFormat};
use parking_lot::RwLock;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Default idle wait between empty drain cycles (milliseconds)
pub const DEFAULT_INTERVAL_MS: u64 = 5000;

/// Default bound on the shutdown join (milliseconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "BATCHLOG";

/// Settings for one named engine (provider)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Queue capacity; unbounded when absent
    pub size: Option<usize>,
    
    /// Capture active scopes onto events
    pub include_scopes: bool,
    
    /// Provider-specific threshold tier
    pub log_level: Option<LevelConfiguration>,
}

/// The `logging` section
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Global threshold tier
    pub log_level: Option<LevelConfiguration>,
    
    /// Provider sections keyed by engine name
    pub providers: HashMap<String, ProviderConfig>,
}

/// Full engine configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub logging: LoggingConfig,
    
    /// Max events per drain cycle; unbounded when absent
    pub batch: Option<usize>,
    
    /// Idle wait in milliseconds
    pub interval: u64,
    
    /// Shutdown join bound in milliseconds
    pub timeout: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            batch: None,
            interval: DEFAULT_INTERVAL_MS,
            timeout: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl EngineConfig {
    /// Load from `batchlog.{toml,yaml,json}` (if present) and the environment
    pub fn load() -> Result<Self> {
        Self::build(Config::builder().add_source(File::with_name("batchlog").required(false)))
    }
    
    /// Load from a specific file, still honoring environment overrides
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::build(Config::builder().add_source(File::from(path.as_ref())))
    }
    
    /// Parse an inline TOML document (no environment overrides)
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let config: Self = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
    
    fn build(builder: config::ConfigBuilder<config::builder::DefaultState>) -> Result<Self> {
        let config: Self = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
    
    /// Reject values the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.batch == Some(0) {
            return Err(EngineError::ConfigError(
                "batch must be at least 1".to_string(),
            ));
        }
        
        for (name, provider) in &self.logging.providers {
            if provider.size == Some(0) {
                return Err(EngineError::ConfigError(format!(
                    "logging.providers.{}.size must be at least 1",
                    name
                )));
            }
        }
        
        Ok(())
    }
    
    /// Provider section for `name`, matched case-insensitively
    pub fn provider(&self, name: &str) -> Option<&ProviderConfig> {
        self.logging
            .providers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, provider)| provider)
    }
    
    pub fn queue_capacity(&self, name: &str) -> Option<usize> {
        self.provider(name).and_then(|p| p.size)
    }
    
    pub fn include_scopes(&self, name: &str) -> bool {
        self.provider(name).map(|p| p.include_scopes).unwrap_or(false)
    }
    
    /// Threshold tiers in priority order: provider first, then global
    ///
    /// Absent sections are skipped entirely.
    pub fn level_tiers(&self, name: &str) -> Vec<&LevelConfiguration> {
        let provider = self.provider(name).and_then(|p| p.log_level.as_ref());
        provider
            .into_iter()
            .chain(self.logging.log_level.as_ref())
            .collect()
    }
    
    /// Max events per drain, never less than one
    pub fn batch_size(&self) -> usize {
        self.batch.unwrap_or(usize::MAX).max(1)
    }
    
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval)
    }
    
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout)
    }
    
    pub fn with_provider(mut self, name: impl Into<String>, provider: ProviderConfig) -> Self {
        self.logging.providers.insert(name.into(), provider);
        self
    }
    
    pub fn with_global_levels(mut self, levels: LevelConfiguration) -> Self {
        self.logging.log_level = Some(levels);
        self
    }
    
    pub fn with_batch(mut self, batch: usize) -> Self {
        self.batch = Some(batch);
        self
    }
    
    pub fn with_interval_ms(mut self, interval: u64) -> Self {
        self.interval = interval;
        self
    }
    
    pub fn with_timeout_ms(mut self, timeout: u64) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Hot-swappable configuration shared by the engine and its worker
#[derive(Debug, Clone, Default)]
pub struct SharedConfig {
    current: Arc<RwLock<Arc<EngineConfig>>>,
}

impl SharedConfig {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(config))),
        }
    }
    
    /// Current configuration; later replacements do not affect it
    pub fn snapshot(&self) -> Arc<EngineConfig> {
        Arc::clone(&self.current.read())
    }
    
    pub fn replace(&self, config: EngineConfig) {
        *self.current.write() = Arc::new(config);
    }
    
    /// Copy, modify and publish the current configuration
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut EngineConfig),
    {
        let mut current = self.current.write();
        let mut next = EngineConfig::clone(&current);
        f(&mut next);
        *current = Arc::new(next);
    }
}

impl From<EngineConfig> for SharedConfig {
    fn from(config: EngineConfig) -> Self {
        Self::new(config)
    }
}
