//! # Activity mapping: config record and mapper contract.
//!
//! [`ActivityConfig`] declares whether events of a type produce activity-log
//! entries at all; [`ActivityMapper`] is the pure function that turns a
//! qualifying event into an [`ActivityDraft`](crate::ActivityDraft) (or
//! `None` for "event observed, no activity produced").

use std::sync::Arc;

use crate::activity::ActivityDraft;
use crate::events::Event;
use crate::registry::Registry;

/// Declarative per-event-type settings for the activity pipeline.
///
/// Never mutated at runtime. An event type with no config entry is silently
/// ignored by the pipeline; `enabled = false` gates it off explicitly.
#[derive(Debug, Clone)]
pub struct ActivityConfig {
    /// Whether qualifying events of this type produce an activity record.
    pub create_activity: bool,
    /// Master switch; `false` suppresses the pipeline entirely for this type.
    pub enabled: bool,
    /// Optional static text a mapper may fall back to.
    pub text: Option<String>,
    /// Optional action identifiers forwarded to the sink's representation.
    pub actions: Option<Vec<String>>,
}

impl Default for ActivityConfig {
    /// Enabled and activity-producing, with no static text or actions.
    fn default() -> Self {
        Self {
            create_activity: true,
            enabled: true,
            text: None,
            actions: None,
        }
    }
}

/// Pure function from an event to an activity draft.
///
/// Returning `None` means "no record for this event"; the pipeline still
/// reports the observation to its sink (see
/// [`ActivityPipeline`](crate::ActivityPipeline)).
pub type ActivityMapper = Arc<dyn Fn(&Event) -> Option<ActivityDraft> + Send + Sync>;

/// Wraps a closure as an [`ActivityMapper`].
///
/// # Example
/// ```rust
/// use herald::{activity_mapper, ActivityDraft};
///
/// let mapper = activity_mapper(|ev| {
///     let tag = ev.payload["tag"].as_str()?;
///     Some(ActivityDraft::new().with_text(format!("created <{tag}>")))
/// });
/// ```
pub fn activity_mapper<F>(f: F) -> ActivityMapper
where
    F: Fn(&Event) -> Option<ActivityDraft> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Mapper/config registry for the activity pipeline.
pub type ActivityRegistry = Registry<ActivityMapper, ActivityConfig>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_creates_and_is_enabled() {
        let cfg = ActivityConfig::default();
        assert!(cfg.create_activity);
        assert!(cfg.enabled);
        assert!(cfg.text.is_none());
    }

    #[test]
    fn test_mapper_fallback_resolution() {
        let reg = ActivityRegistry::new()
            .with_default_mapper(activity_mapper(|_| None))
            .with_config("element.created", ActivityConfig::default());

        // Config-only type resolves to the default mapper.
        assert!(reg.mapper("element.created").is_some());
        assert_eq!(reg.event_types(), vec!["element.created"]);
    }
}
