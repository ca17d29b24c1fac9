// packages/engine/src/sink/record.rs
//! Serializable view of an event

use crate::event::{Event, Level};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Borrowed, JSON-ready rendering of an [`Event`]
///
/// Errors are flattened to their source chain; scopes to their `Debug` text.
#[derive(Debug, Serialize)]
pub struct EventRecord<'a> {
    pub timestamp: DateTime<Utc>,
    pub level: Level,
    pub category: &'a str,
    pub event_id: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub error: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub scopes: Vec<String>,
}

impl<'a> From<&'a Event> for EventRecord<'a> {
    fn from(event: &'a Event) -> Self {
        let mut error = Vec::new();
        if let Some(payload) = event.error() {
            let root: &(dyn std::error::Error + 'static) = &**payload;
            let mut current = Some(root);
            while let Some(err) = current {
                error.push(err.to_string());
                current = err.source();
            }
        }

        Self {
            timestamp: event.timestamp(),
            level: event.level(),
            category: event.category(),
            event_id: event.event_id().id,
            event_name: event.event_id().name.as_deref(),
            message: event.message(),
            error,
            scopes: event.scopes().iter().map(|s| format!("{:?}", s)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventId, Scope};
    use std::sync::Arc;

    #[derive(Debug)]
    struct Outer(std::io::Error);

    impl std::fmt::Display for Outer {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("request failed")
        }
    }

    impl std::error::Error for Outer {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn test_record_json() {
        let event = Event::new(
            "App.Http",
            Level::Error,
            EventId::named(7, "Request"),
            Some("boom".to_string()),
        )
        .with_error(Arc::new(Outer(std::io::Error::new(
            std::io::ErrorKind::TimedOut,
            "timed out",
        ))))
        .with_scopes(vec![Scope::new("req-1".to_string())]);

        let json = serde_json::to_value(EventRecord::from(&event)).unwrap();

        assert_eq!(json["level"], "Error");
        assert_eq!(json["category"], "App.Http");
        assert_eq!(json["event_id"], 7);
        assert_eq!(json["event_name"], "Request");
        assert_eq!(json["message"], "boom");
        assert_eq!(json["error"][0], "request failed");
        assert_eq!(json["error"][1], "timed out");
        assert_eq!(json["scopes"][0], "\"req-1\"");
    }

    #[test]
    fn test_optional_fields_skipped() {
        let event = Event::new("App", Level::Debug, EventId::default(), None);
        let json = serde_json::to_value(EventRecord::from(&event)).unwrap();

        assert!(json.get("message").is_none());
        assert!(json.get("event_name").is_none());
        assert!(json.get("error").is_none());
        assert!(json.get("scopes").is_none());
    }
}
