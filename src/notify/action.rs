//! # Sink actions: the notification callback contract.
//!
//! The [`Notifier`](crate::Notifier) never reads the external store; it only
//! pushes [`NotifyAction`] values through the registered sink. The consumer
//! translates them into its own persisted representation.

use serde::Serialize;

use super::record::Notification;

/// Tagged action delivered to the notification sink.
///
/// Serializes with a lowercase `"type"` tag, e.g.
/// `{"type":"remove","id":"…"}`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NotifyAction {
    /// A new notification entered the visible set.
    Add {
        /// The full record; the sink owns storage from here on.
        payload: Notification,
    },
    /// Delete the notification from the sink entirely (temporary retention).
    Remove {
        /// Target notification id.
        id: String,
    },
    /// Auto-expired but persistent: keep in the sink, hide from the UI.
    Hide {
        /// Target notification id.
        id: String,
    },
    /// User-closed but persistent: keep in the sink, mark dismissed.
    Dismiss {
        /// Target notification id.
        id: String,
    },
    /// Read: remove from the visible set regardless of persistence.
    Read {
        /// Target notification id.
        id: String,
    },
}

impl NotifyAction {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            NotifyAction::Add { .. } => "add",
            NotifyAction::Remove { .. } => "remove",
            NotifyAction::Hide { .. } => "hide",
            NotifyAction::Dismiss { .. } => "dismiss",
            NotifyAction::Read { .. } => "read",
        }
    }

    /// Returns the id of the notification this action targets.
    pub fn id(&self) -> &str {
        match self {
            NotifyAction::Add { payload } => &payload.id,
            NotifyAction::Remove { id }
            | NotifyAction::Hide { id }
            | NotifyAction::Dismiss { id }
            | NotifyAction::Read { id } => id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shape_is_type_tagged_lowercase() {
        let v = serde_json::to_value(NotifyAction::Remove { id: "n-1".into() }).unwrap();
        assert_eq!(v, serde_json::json!({ "type": "remove", "id": "n-1" }));

        let v = serde_json::to_value(NotifyAction::Hide { id: "n-2".into() }).unwrap();
        assert_eq!(v["type"], "hide");
    }

    #[test]
    fn test_label_and_id_accessors() {
        let action = NotifyAction::Dismiss { id: "n-3".into() };
        assert_eq!(action.as_label(), "dismiss");
        assert_eq!(action.id(), "n-3");
    }
}
