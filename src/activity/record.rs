//! # Activity record: permanent history entries derived from events.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::events::{Event, RecordKind};

/// Mapper output: the caller-determined parts of an activity record.
///
/// The pipeline fills in identity, the event back-reference, timestamps and
/// the payload-snapshot source; a mapper only decides presentation.
#[derive(Debug, Clone, Default)]
pub struct ActivityDraft {
    /// Display title; defaults to the empty string.
    pub title: Option<String>,
    /// Display text; falls back to the config's static text, then empty.
    pub text: Option<String>,
    /// Opaque source data; defaults to a snapshot of the event payload.
    pub source: Option<serde_json::Value>,
}

impl ActivityDraft {
    /// Creates an empty draft.
    pub fn new() -> Self {
        Self::default()
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
}

/// Immutable activity-log entry.
///
/// Created once per qualifying event and forwarded to the sink, which owns
/// storage from then on. `event_id` is a back-reference, not ownership: the
/// activity outlives any in-memory event.
#[derive(Debug, Clone, Serialize)]
pub struct Activity {
    /// Unique record id (UUID v7).
    pub id: String,
    /// Always [`RecordKind::Activity`].
    pub kind: RecordKind,
    /// Id of the event this entry was derived from.
    pub event_id: u64,
    /// Display title.
    pub title: String,
    /// Display text.
    pub text: String,
    /// Opaque payload snapshot taken at creation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<serde_json::Value>,
    /// Wall-clock creation time.
    pub created_at: DateTime<Utc>,
    /// Equal to `created_at`; activities are append-only.
    pub updated_at: DateTime<Utc>,
}

impl Activity {
    /// Assembles a full record from a mapper draft and its source event.
    pub fn from_draft(event: &Event, draft: ActivityDraft) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::now_v7().to_string(),
            kind: RecordKind::Activity,
            event_id: event.id,
            title: draft.title.unwrap_or_default(),
            text: draft.text.unwrap_or_default(),
            source: draft.source.or_else(|| Some(event.payload.clone())),
            created_at: now,
            updated_at: now,
        }
    }
}
