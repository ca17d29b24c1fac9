// packages/engine/src/engine/logger.rs
//! Category-bound logging front-end
//!
//! A [`Logger`] turns call sites into [`Engine::emit`] calls, supplying its
//! category and the scopes active on the calling thread.

use crate::engine::facade::Engine;
use crate::event::{ErrorPayload, EventId, Level, ScopeGuard, ScopeStack, ScopeValue};
use std::sync::Arc;

/// Logger for one category
#[derive(Clone)]
pub struct Logger {
    engine: Engine,
    category: Arc<str>,
}

impl Logger {
    pub(crate) fn new(engine: Engine, category: String) -> Self {
        Self {
            engine,
            category: category.into(),
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn is_enabled(&self, level: Level) -> bool {
        self.engine.is_enabled(&self.category, level)
    }

    /// Activate a scope on this thread until the guard is dropped
    pub fn begin_scope<T: ScopeValue>(&self, value: T) -> ScopeGuard {
        ScopeStack::push(value)
    }

    /// Emit an event; `message` runs only if `level` is enabled
    pub fn log<F, M>(
        &self,
        level: Level,
        event_id: impl Into<EventId>,
        error: Option<ErrorPayload>,
        message: F,
    ) where
        F: FnOnce() -> M,
        M: Into<Option<String>>,
    {
        self.engine.emit_with(
            &self.category,
            level,
            event_id.into(),
            message,
            error,
            ScopeStack::current,
        );
    }

    pub fn trace<F, M>(&self, message: F)
    where
        F: FnOnce() -> M,
        M: Into<Option<String>>,
    {
        self.log(Level::Trace, EventId::default(), None, message);
    }

    pub fn debug<F, M>(&self, message: F)
    where
        F: FnOnce() -> M,
        M: Into<Option<String>>,
    {
        self.log(Level::Debug, EventId::default(), None, message);
    }

    pub fn info<F, M>(&self, message: F)
    where
        F: FnOnce() -> M,
        M: Into<Option<String>>,
    {
        self.log(Level::Information, EventId::default(), None, message);
    }

    pub fn warn<F, M>(&self, message: F)
    where
        F: FnOnce() -> M,
        M: Into<Option<String>>,
    {
        self.log(Level::Warning, EventId::default(), None, message);
    }

    pub fn error<F, M>(&self, message: F)
    where
        F: FnOnce() -> M,
        M: Into<Option<String>>,
    {
        self.log(Level::Error, EventId::default(), None, message);
    }

    pub fn critical<F, M>(&self, message: F)
    where
        F: FnOnce() -> M,
        M: Into<Option<String>>,
    {
        self.log(Level::Critical, EventId::default(), None, message);
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("engine", &self.engine.name())
            .field("category", &self.category)
            .finish()
    }
}
