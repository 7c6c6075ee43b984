//! # Notification mapping: config record and mapper contract.
//!
//! [`NotificationConfig`] drives the lifecycle behavior of notifications
//! created from events (auto-dismiss duration, persistent retention);
//! [`NotifyMapper`] turns a qualifying event into a
//! [`NotificationDraft`](crate::NotificationDraft), or `None` to produce
//! nothing.
//!
//! ## Sentinel values
//! - `duration = Duration::ZERO` → no auto-dismiss timer is scheduled; the
//!   notification stays until manually dismissed or read.

use std::sync::Arc;
use std::time::Duration;

use crate::events::Event;
use crate::notify::NotificationDraft;
use crate::registry::Registry;

/// Auto-dismiss delay applied when a config (or a manual
/// [`show`](crate::Notifier::show) draft) does not specify one.
pub const DEFAULT_DURATION: Duration = Duration::from_millis(5000);

/// Declarative per-event-type settings for the notification lifecycle.
///
/// Drives behavior, not state: the [`Notifier`](crate::Notifier) re-reads the
/// `persistent` flag from this record whenever a timer fires or a manual
/// action arrives for a notification originating from this event type.
#[derive(Debug, Clone)]
pub struct NotificationConfig {
    /// Master switch; `false` suppresses notifications for this type.
    pub enabled: bool,
    /// Auto-dismiss delay. `Duration::ZERO` disables the timer.
    pub duration: Duration,
    /// Retention after visibility ends: persistent notifications are hidden
    /// or marked dismissed in the sink; temporary ones are deleted outright.
    pub persistent: bool,
    /// Optional UI placement hint; read by the sink, not by this crate.
    pub position: Option<String>,
    /// Optional action identifiers forwarded to the sink's representation.
    pub actions: Option<Vec<String>>,
}

impl Default for NotificationConfig {
    /// Enabled, temporary, auto-dismissing after [`DEFAULT_DURATION`].
    fn default() -> Self {
        Self {
            enabled: true,
            duration: DEFAULT_DURATION,
            persistent: false,
            position: None,
            actions: None,
        }
    }
}

/// Pure function from an event to a notification draft.
///
/// Returning `None` means no notification is created for this event.
pub type NotifyMapper = Arc<dyn Fn(&Event) -> Option<NotificationDraft> + Send + Sync>;

/// Wraps a closure as a [`NotifyMapper`].
///
/// # Example
/// ```rust
/// use herald::{notify_mapper, NotificationDraft, Severity};
///
/// let mapper = notify_mapper(|ev| {
///     Some(
///         NotificationDraft::new()
///             .with_severity(Severity::Success)
///             .with_text(format!("{} completed", ev.event_type)),
///     )
/// });
/// ```
pub fn notify_mapper<F>(f: F) -> NotifyMapper
where
    F: Fn(&Event) -> Option<NotificationDraft> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Mapper/config registry for the notification lifecycle manager.
pub type NotifyRegistry = Registry<NotifyMapper, NotificationConfig>;
