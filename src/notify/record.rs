//! # Notification record: transient, stateful UI alerts.
//!
//! A [`Notification`] is created from an event (via a mapper) or manually
//! (via [`Notifier::show`](crate::Notifier::show)). Unlike activities it has
//! a visibility lifecycle: the three nullable timestamps (`shown_at`,
//! `read_at`, `dismissed_at`) encode it, and their combination is the sole
//! source of truth for "is this visible in the UI". [`Notification::state`]
//! derives the conceptual state machine from them.
//!
//! This subsystem always constructs notifications with all three timestamps
//! unset (the `Visible` state); the sink stamps them as it applies the
//! lifecycle actions it receives.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::events::{Event, RecordKind};

/// Severity of a notification, determining its visual styling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Indicates a successful operation or positive outcome.
    Success,
    /// Indicates an error or failure.
    Error,
    /// Indicates a non-critical issue the user should be aware of.
    Warning,
    /// Neutral informational message.
    #[default]
    Info,
}

impl Severity {
    /// Returns the lowercase wire label.
    pub fn as_label(&self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

/// Lifecycle state derived from the three nullable timestamps.
///
/// Not stored on the record; see [`Notification::state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationState {
    /// Freshly created, visible in the UI. All timestamps unset.
    Visible,
    /// Auto-expired but retained (persistent); hidden from the UI.
    Hidden,
    /// User-closed but retained (persistent).
    Dismissed,
    /// Read; removed from the visible set everywhere.
    Read,
}

/// Transient UI alert with a visibility lifecycle.
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    /// Unique record id (UUID v7 unless caller-supplied).
    pub id: String,
    /// Always [`RecordKind::Notification`].
    pub kind: RecordKind,
    /// Severity, serialized as `"type"`.
    #[serde(rename = "type")]
    pub severity: Severity,
    /// Back-reference to the originating event, if event-driven.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<u64>,
    /// Type of the originating event, if event-driven.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    /// Display title.
    pub title: String,
    /// Display text.
    pub text: String,
    /// Opaque payload snapshot, if event-driven (or draft-supplied).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<serde_json::Value>,
    /// Optional display priority.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,
    /// Optional recipient identifiers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipients: Option<Vec<String>>,
    /// Wall-clock creation time.
    pub created_at: DateTime<Utc>,
    /// Set by the sink when auto-expiry hides a persistent notification.
    pub shown_at: Option<DateTime<Utc>>,
    /// Set by the sink when the notification is read.
    pub read_at: Option<DateTime<Utc>>,
    /// Set by the sink when the user dismisses a persistent notification.
    pub dismissed_at: Option<DateTime<Utc>>,
}

impl Notification {
    /// Assembles a full record from a draft.
    ///
    /// Missing fields are defaulted: generated id, [`Severity::Info`], empty
    /// title/text, `created_at = now`. When `event` is given, the record
    /// back-references it and snapshots its payload as the default source.
    pub fn from_draft(draft: NotificationDraft, event: Option<&Event>) -> Self {
        Self {
            id: draft
                .id
                .unwrap_or_else(|| uuid::Uuid::now_v7().to_string()),
            kind: RecordKind::Notification,
            severity: draft.severity.unwrap_or_default(),
            event_id: event.map(|e| e.id),
            event_type: event.map(|e| e.event_type.clone()),
            title: draft.title.unwrap_or_default(),
            text: draft.text.unwrap_or_default(),
            source: draft.source.or_else(|| event.map(|e| e.payload.clone())),
            priority: draft.priority,
            recipients: draft.recipients,
            created_at: Utc::now(),
            shown_at: None,
            read_at: None,
            dismissed_at: None,
        }
    }

    /// Derives the lifecycle state from the timestamp fields.
    ///
    /// Precedence mirrors the lifecycle: a read notification is `Read` no
    /// matter what else was stamped before.
    pub fn state(&self) -> NotificationState {
        if self.read_at.is_some() {
            NotificationState::Read
        } else if self.dismissed_at.is_some() {
            NotificationState::Dismissed
        } else if self.shown_at.is_some() {
            NotificationState::Hidden
        } else {
            NotificationState::Visible
        }
    }
}

/// Caller-determined parts of a notification.
///
/// Mapper output for the event-driven path, and the input to
/// [`Notifier::show`](crate::Notifier::show) for the manual path. `duration`
/// is honored by `show()` only; event-driven notifications take their
/// duration from the [`NotificationConfig`](crate::NotificationConfig).
#[derive(Debug, Clone, Default)]
pub struct NotificationDraft {
    /// Record id; generated (UUID v7) when absent.
    pub id: Option<String>,
    /// Severity; defaults to [`Severity::Info`].
    pub severity: Option<Severity>,
    /// Display title; defaults to the empty string.
    pub title: Option<String>,
    /// Display text; defaults to the empty string.
    pub text: Option<String>,
    /// Opaque source data.
    pub source: Option<serde_json::Value>,
    /// Optional display priority.
    pub priority: Option<u32>,
    /// Optional recipient identifiers.
    pub recipients: Option<Vec<String>>,
    /// Auto-dismiss delay for `show()`; defaults to
    /// [`DEFAULT_DURATION`](crate::DEFAULT_DURATION). `Duration::ZERO`
    /// disables the timer.
    pub duration: Option<Duration>,
}

impl NotificationDraft {
    /// Creates an empty draft.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the record id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the severity.
    #[must_use]
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    /// Sets the display title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the display text.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Sets the opaque source data.
    #[must_use]
    pub fn with_source(mut self, source: serde_json::Value) -> Self {
        self.source = Some(source);
        self
    }

    /// Sets the display priority.
    #[must_use]
    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Sets the recipient identifiers.
    #[must_use]
    pub fn with_recipients(mut self, recipients: Vec<String>) -> Self {
        self.recipients = Some(recipients);
        self
    }

    /// Sets the auto-dismiss delay used by `show()`.
    #[must_use]
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_draft_defaults() {
        let n = Notification::from_draft(NotificationDraft::new(), None);
        assert_eq!(n.severity, Severity::Info);
        assert_eq!(n.title, "");
        assert_eq!(n.text, "");
        assert!(n.event_id.is_none());
        assert!(!n.id.is_empty());
        assert_eq!(n.state(), NotificationState::Visible);
    }

    #[test]
    fn test_from_draft_with_event_back_references() {
        let ev = Event::new("export.finished", serde_json::json!({ "pages": 3 }));
        let n = Notification::from_draft(
            NotificationDraft::new().with_severity(Severity::Success),
            Some(&ev),
        );
        assert_eq!(n.event_id, Some(ev.id));
        assert_eq!(n.event_type.as_deref(), Some("export.finished"));
        assert_eq!(n.source, Some(ev.payload.clone()));
    }

    #[test]
    fn test_caller_supplied_id_is_kept() {
        let n = Notification::from_draft(NotificationDraft::new().with_id("n-1"), None);
        assert_eq!(n.id, "n-1");
    }

    #[test]
    fn test_state_precedence() {
        let mut n = Notification::from_draft(NotificationDraft::new(), None);
        assert_eq!(n.state(), NotificationState::Visible);

        n.shown_at = Some(Utc::now());
        assert_eq!(n.state(), NotificationState::Hidden);

        n.dismissed_at = Some(Utc::now());
        assert_eq!(n.state(), NotificationState::Dismissed);

        n.read_at = Some(Utc::now());
        assert_eq!(n.state(), NotificationState::Read);
    }

    #[test]
    fn test_severity_serializes_as_type() {
        let n = Notification::from_draft(
            NotificationDraft::new().with_severity(Severity::Warning),
            None,
        );
        let v = serde_json::to_value(&n).unwrap();
        assert_eq!(v["type"], "warning");
        assert_eq!(v["kind"], "notification");
    }
}
