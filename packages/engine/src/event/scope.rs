// packages/engine/src/event/scope.rs
//! Opaque ambient-context values attached to events
//!
//! The engine never looks inside a [`Scope`]; it only stores the handle on
//! the event and forwards it to the sink. Sinks may downcast or use the
//! `Debug` rendering.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Any value that can travel with an event across threads
pub trait ScopeValue: Any + fmt::Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any + fmt::Debug + Send + Sync> ScopeValue for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Shared handle to one scope value
#[derive(Clone)]
pub struct Scope(Arc<dyn ScopeValue>);

impl Scope {
    pub fn new<T: ScopeValue>(value: T) -> Self {
        Self(Arc::new(value))
    }

    /// Borrow the value as `T` if that is its concrete type
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        let value: &dyn ScopeValue = &*self.0;
        value.as_any().downcast_ref::<T>()
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

thread_local! {
    static ACTIVE: RefCell<Vec<Scope>> = const { RefCell::new(Vec::new()) };
}

/// Per-thread stack of active scopes
///
/// Scopes are listed outermost first. A scope stays active until the
/// [`ScopeGuard`] returned by [`ScopeStack::push`] is dropped.
pub struct ScopeStack;

impl ScopeStack {
    /// Activate a scope on the current thread
    pub fn push<T: ScopeValue>(value: T) -> ScopeGuard {
        let depth = ACTIVE.with(|active| {
            let mut active = active.borrow_mut();
            active.push(Scope::new(value));
            active.len()
        });

        ScopeGuard {
            depth,
            _not_send: PhantomData,
        }
    }

    /// Snapshot of the active scopes, outermost first
    pub fn current() -> Vec<Scope> {
        ACTIVE.with(|active| active.borrow().clone())
    }

    pub fn depth() -> usize {
        ACTIVE.with(|active| active.borrow().len())
    }
}

/// Deactivates its scope (and anything pushed after it) when dropped
#[must_use = "the scope is popped as soon as the guard is dropped"]
pub struct ScopeGuard {
    depth: usize,
    // Guards must be dropped on the thread that created them
    _not_send: PhantomData<*const ()>,
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        let _ = ACTIVE.try_with(|active| {
            active.borrow_mut().truncate(self.depth.saturating_sub(1));
        });
    }
}
