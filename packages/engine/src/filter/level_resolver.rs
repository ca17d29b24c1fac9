// packages/engine/src/filter/level_resolver.rs
//! Hierarchical category threshold resolution
//!
//! A category such as `App.Module.Sub` is matched against each configuration
//! tier by longest dotted prefix:
//!
//! ```text
//! App.Module.Sub → App.Module → App → Default
//! ```
//!
//! The first tier with any match wins. Without a match anywhere the
//! threshold is [`Level::Information`].

use crate::event::Level;
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;

/// Key consulted once every category segment has been dropped
pub const DEFAULT_KEY: &str = "Default";

/// Threshold used when no tier matches
pub const BASELINE_LEVEL: Level = Level::Information;

/// Category-prefix → minimum level mapping for one tier
///
/// Keys compare case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelConfiguration {
    thresholds: HashMap<String, Level>,
}

impl LevelConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, prefix: &str, level: Level) -> Self {
        self.insert(prefix, level);
        self
    }

    pub fn insert(&mut self, prefix: &str, level: Level) {
        self.thresholds.insert(prefix.to_lowercase(), level);
    }

    /// Explicit threshold for exactly this key
    pub fn get(&self, key: &str) -> Option<Level> {
        self.thresholds.get(&key.to_lowercase()).copied()
    }

    pub fn len(&self) -> usize {
        self.thresholds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.thresholds.is_empty()
    }

    /// Longest-prefix lookup within this tier alone
    ///
    /// `category` must already be lower-cased.
    fn lookup(&self, category: &str) -> Option<Level> {
        let mut key = category;
        loop {
            if let Some(level) = self.thresholds.get(key) {
                return Some(*level);
            }
            match key.rfind('.') {
                Some(idx) => key = &key[..idx],
                None => break,
            }
        }

        self.thresholds.get("default").copied()
    }
}

impl<'a> FromIterator<(&'a str, Level)> for LevelConfiguration {
    fn from_iter<I: IntoIterator<Item = (&'a str, Level)>>(iter: I) -> Self {
        let mut config = Self::new();
        for (prefix, level) in iter {
            config.insert(prefix, level);
        }
        config
    }
}

impl<'de> Deserialize<'de> for LevelConfiguration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = HashMap::<String, Level>::deserialize(deserializer)?;
        Ok(raw
            .iter()
            .map(|(prefix, level)| (prefix.as_str(), *level))
            .collect())
    }
}

/// Resolve the effective minimum level for `category`
///
/// Tiers are consulted in priority order and each one is searched from the
/// full category. Pure and lock-free: callers pass read-only snapshots.
pub fn resolve(category: &str, tiers: &[&LevelConfiguration]) -> Level {
    let category = category.to_lowercase();

    tiers
        .iter()
        .find_map(|tier| tier.lookup(&category))
        .unwrap_or(BASELINE_LEVEL)
}

/// Whether an event at `level` passes the threshold resolved for `category`
pub fn is_enabled(category: &str, level: Level, tiers: &[&LevelConfiguration]) -> bool {
    level != Level::None && level >= resolve(category, tiers)
}
