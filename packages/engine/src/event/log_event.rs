// packages/engine/src/event/log_event.rs
//! Immutable log event
//!
//! An [`Event`] is fully built before it is handed to the queue and is never
//! mutated afterwards, so it crosses threads without any synchronization of
//! its own.

use crate::event::level::Level;
use crate::event::scope::Scope;
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;

/// Causal error attached to an event
pub type ErrorPayload = Arc<dyn std::error::Error + Send + Sync>;

/// Optional structured event identifier
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct EventId {
    pub id: i32,
    pub name: Option<String>,
}

impl EventId {
    pub fn new(id: i32) -> Self {
        Self { id, name: None }
    }

    pub fn named(id: i32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: Some(name.into()),
        }
    }
}

impl From<i32> for EventId {
    fn from(id: i32) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}:{}", self.id, name),
            None => write!(f, "{}", self.id),
        }
    }
}

/// One log occurrence
#[derive(Debug, Clone)]
pub struct Event {
    category: String,
    level: Level,
    event_id: EventId,
    timestamp: DateTime<Utc>,
    message: Option<String>,
    error: Option<ErrorPayload>,
    scopes: Vec<Scope>,
}

impl Event {
    /// Create an event stamped with the current time
    pub fn new(
        category: impl Into<String>,
        level: Level,
        event_id: EventId,
        message: Option<String>,
    ) -> Self {
        Self {
            category: category.into(),
            level,
            event_id,
            timestamp: Utc::now(),
            message,
            error: None,
            scopes: Vec::new(),
        }
    }

    pub fn with_error(mut self, error: ErrorPayload) -> Self {
        self.error = Some(error);
        self
    }

    /// Attach the captured scope chain, in the order it was captured
    pub fn with_scopes(mut self, scopes: Vec<Scope>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Synthetic warning announcing events lost to a full or closed queue
    pub fn dropped_notice(category: impl Into<String>, dropped: u64) -> Self {
        Self::new(
            category,
            Level::Warning,
            EventId::new(0),
            Some(format!(
                "{} message(s) dropped because of queue size limit",
                dropped
            )),
        )
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn event_id(&self) -> &EventId {
        &self.event_id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn error(&self) -> Option<&ErrorPayload> {
        self.error.as_ref()
    }

    pub fn scopes(&self) -> &[Scope] {
        &self.scopes
    }
}
