//! # Event record constructed by the bus.
//!
//! An [`Event`] is an immutable snapshot of "something happened": a dispatch
//! key ([`Event::event_type`]), a process-unique id, wall-clock timestamps,
//! and an arbitrary structured payload. Events are constructed by
//! [`Bus::emit`](crate::Bus::emit) and never mutated afterwards.
//!
//! ## Identity
//! Ids come from a global monotonically increasing counter, so they are
//! unique for the lifetime of the process. Downstream records keep the id as
//! a back-reference (`event_id`), never as ownership.
//!
//! ## Example
//! ```rust
//! use herald::Event;
//!
//! let ev = Event::new("element.created", serde_json::json!({ "tag": "div" }));
//! assert_eq!(ev.event_type, "element.created");
//! assert_eq!(ev.payload["tag"], "div");
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Global sequence counter for event identity.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Discriminates the three record families this crate produces.
///
/// Serialized lowercase; every record carries its kind so the sink can route
/// mixed streams without inspecting the shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    /// Raw domain event emitted on the bus.
    Event,
    /// Permanent activity-log entry derived from an event.
    Activity,
    /// Transient, stateful UI alert.
    Notification,
}

/// Immutable domain event.
///
/// Constructed by [`Bus::emit`](crate::Bus::emit) (or directly in tests);
/// `created_at` and `updated_at` are both stamped at construction and stay
/// equal for the record's lifetime, since events are never updated.
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    /// Process-unique, monotonically increasing id.
    pub id: u64,
    /// Always [`RecordKind::Event`].
    pub kind: RecordKind,
    /// Dispatch key; handlers subscribe to this exact string.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Wall-clock construction time.
    pub created_at: DateTime<Utc>,
    /// Equal to `created_at`; present for record-shape uniformity.
    pub updated_at: DateTime<Utc>,
    /// Producer-supplied structured data, attached verbatim.
    pub payload: serde_json::Value,
}

impl Event {
    /// Creates a new event with a fresh id and current timestamps.
    ///
    /// The payload is attached verbatim; no schema validation happens here —
    /// schema correctness is the producer's responsibility.
    pub fn new(event_type: impl Into<String>, payload: serde_json::Value) -> Self {
        let now = Utc::now();
        Self {
            id: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            kind: RecordKind::Event,
            event_type: event_type.into(),
            created_at: now,
            updated_at: now,
            payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique_and_increasing() {
        let a = Event::new("x", serde_json::Value::Null);
        let b = Event::new("x", serde_json::Value::Null);
        let c = Event::new("y", serde_json::Value::Null);
        assert!(a.id < b.id);
        assert!(b.id < c.id);
    }

    #[test]
    fn test_payload_attached_verbatim() {
        let payload = serde_json::json!({ "elementId": "e1", "tag": "div" });
        let ev = Event::new("element.created", payload.clone());
        assert_eq!(ev.payload, payload);
        assert_eq!(ev.created_at, ev.updated_at);
    }

    #[test]
    fn test_serialized_shape_uses_type_and_lowercase_kind() {
        let ev = Event::new("doc.saved", serde_json::json!(1));
        let v = serde_json::to_value(&ev).unwrap();
        assert_eq!(v["kind"], "event");
        assert_eq!(v["type"], "doc.saved");
        assert_eq!(v["payload"], 1);
    }
}
