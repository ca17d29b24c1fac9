// packages/engine/src/event/mod.rs
//! Event value types
//!
//! - **Level**: ordered severity, `Trace` lowest
//! - **Event**: immutable log occurrence handed from producers to the sink
//! - **Scope**: opaque ambient context captured with an event

pub mod level;
pub mod log_event;
pub mod scope;

pub use level::{Level, ParseLevelError};
pub use log_event::{ErrorPayload, Event, EventId};
pub use scope::{Scope, ScopeGuard, ScopeStack, ScopeValue};
