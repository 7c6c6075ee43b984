//! # Activity pipeline: events in, history records out.
//!
//! [`ActivityPipeline`] subscribes to the bus for every configured event type
//! and maps qualifying events into [`Activity`] records, pushed to a single
//! registered sink.
//!
//! ## Architecture
//! ```text
//! Bus ──► pipeline handler (one per event type)
//!            ├─ no config entry, or enabled == false ──► nothing
//!            ├─ create_activity == false             ──► nothing
//!            └─ mapper(event)
//!                 ├─ Some(draft) ──► sink(Some(activity))
//!                 └─ None        ──► sink(None)   ("observed, nothing produced")
//! ```
//!
//! ## Rules
//! - The sink is called with `Option<Activity>` whenever a gated-in event is
//!   observed, even when the mapper produced nothing; the consumer decides
//!   whether a `None` observation is meaningful.
//! - Sink panics are caught and logged with the offending event id; they
//!   never propagate into the bus.
//! - The pipeline holds no mutable state beyond its subscription list and
//!   the sink slot.
//!
//! ## Example
//! ```rust
//! use std::collections::HashMap;
//! use std::sync::{Arc, Mutex};
//! use herald::{activity_mapper, ActivityConfig, ActivityDraft, ActivityPipeline, Bus};
//!
//! let bus = Bus::new();
//! let pipeline = ActivityPipeline::builder()
//!     .bus(bus.clone())
//!     .mappers(HashMap::from([(
//!         "element.created".to_string(),
//!         activity_mapper(|ev| {
//!             let tag = ev.payload["tag"].as_str()?;
//!             Some(ActivityDraft::new().with_text(format!("created <{tag}>")))
//!         }),
//!     )]))
//!     .configs(HashMap::from([(
//!         "element.created".to_string(),
//!         ActivityConfig::default(),
//!     )]))
//!     .build()
//!     .unwrap();
//!
//! let log = Arc::new(Mutex::new(Vec::new()));
//! let sink_log = Arc::clone(&log);
//! pipeline.initialize(move |activity| {
//!     sink_log.lock().unwrap().push(activity);
//! });
//!
//! bus.emit("element.created", serde_json::json!({ "tag": "div" }));
//! assert_eq!(log.lock().unwrap().len(), 1);
//!
//! pipeline.destroy();
//! ```

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

use crate::activity::Activity;
use crate::error::BuildError;
use crate::events::{Bus, Event, Subscription};
use crate::registry::{ActivityConfig, ActivityMapper, ActivityRegistry};

type ActivitySink = Arc<dyn Fn(Option<Activity>) + Send + Sync>;

struct PipelineInner {
    bus: Bus,
    registry: ActivityRegistry,
    sink: Mutex<Option<ActivitySink>>,
    subscriptions: Mutex<Vec<Subscription>>,
}

/// Maps bus events into immutable [`Activity`] records.
///
/// Built from its three required collaborators (bus, mapper table, config
/// table); wired to the bus by [`ActivityPipeline::initialize`] and torn
/// down by [`ActivityPipeline::destroy`].
#[derive(Clone)]
pub struct ActivityPipeline {
    inner: Arc<PipelineInner>,
}

impl std::fmt::Debug for ActivityPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivityPipeline").finish_non_exhaustive()
    }
}

impl ActivityPipeline {
    /// Starts building a pipeline.
    pub fn builder() -> ActivityPipelineBuilder {
        ActivityPipelineBuilder::new()
    }

    /// Registers the sink and subscribes to every configured event type.
    ///
    /// One-time: a second call without an intervening
    /// [`destroy`](Self::destroy) is a no-op with a warning, and the first
    /// registration wins.
    pub fn initialize<F>(&self, sink: F)
    where
        F: Fn(Option<Activity>) + Send + Sync + 'static,
    {
        {
            let mut slot = self.inner.sink.lock().unwrap();
            if slot.is_some() {
                tracing::warn!("activity pipeline already initialized; ignoring this call");
                return;
            }
            *slot = Some(Arc::new(sink));
        }

        let mut subs = self.inner.subscriptions.lock().unwrap();
        for event_type in self.inner.registry.event_types() {
            let inner = Arc::clone(&self.inner);
            subs.push(self.inner.bus.on(event_type, move |ev| inner.on_event(ev)));
        }
    }

    /// Unsubscribes every handler and clears the sink.
    ///
    /// Safe to call multiple times; after it returns the pipeline can be
    /// initialized again.
    pub fn destroy(&self) {
        {
            let mut subs = self.inner.subscriptions.lock().unwrap();
            for sub in subs.drain(..) {
                sub.unsubscribe();
            }
        }
        *self.inner.sink.lock().unwrap() = None;
    }
}

impl PipelineInner {
    fn on_event(&self, event: &Event) {
        let Some(config) = self.registry.config(&event.event_type) else {
            return;
        };
        if !config.enabled || !config.create_activity {
            return;
        }

        let activity = self
            .registry
            .mapper(&event.event_type)
            .and_then(|mapper| mapper(event))
            .map(|mut draft| {
                if draft.text.is_none() {
                    draft.text = config.text.clone();
                }
                Activity::from_draft(event, draft)
            });

        let sink = self.sink.lock().unwrap().clone();
        let Some(sink) = sink else {
            tracing::debug!(event_id = event.id, "no activity sink registered; dropping");
            return;
        };
        if let Err(panic) = catch_unwind(AssertUnwindSafe(|| sink(activity))) {
            tracing::error!(
                event_id = event.id,
                event_type = %event.event_type,
                ?panic,
                "activity sink panicked"
            );
        }
    }
}

/// Builder for [`ActivityPipeline`].
///
/// All three collaborators are required; [`build`](Self::build) fails fast
/// on the first missing one.
#[derive(Default)]
pub struct ActivityPipelineBuilder {
    bus: Option<Bus>,
    mappers: Option<HashMap<String, ActivityMapper>>,
    configs: Option<HashMap<String, ActivityConfig>>,
}

impl ActivityPipelineBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the event bus to subscribe on.
    #[must_use]
    pub fn bus(mut self, bus: Bus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Sets the mapper table (event type → mapper; `"default"` reserved for
    /// the fallback mapper).
    #[must_use]
    pub fn mappers(mut self, mappers: HashMap<String, ActivityMapper>) -> Self {
        self.mappers = Some(mappers);
        self
    }

    /// Sets the config table (event type → [`ActivityConfig`]).
    #[must_use]
    pub fn configs(mut self, configs: HashMap<String, ActivityConfig>) -> Self {
        self.configs = Some(configs);
        self
    }

    /// Builds the pipeline, failing on the first missing collaborator.
    pub fn build(self) -> Result<ActivityPipeline, BuildError> {
        let bus = self.bus.ok_or(BuildError::MissingBus)?;
        let mappers = self.mappers.ok_or(BuildError::MissingMappers)?;
        let configs = self.configs.ok_or(BuildError::MissingConfigs)?;

        Ok(ActivityPipeline {
            inner: Arc::new(PipelineInner {
                bus,
                registry: ActivityRegistry::from_tables(mappers, configs),
                sink: Mutex::new(None),
                subscriptions: Mutex::new(Vec::new()),
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::activity_mapper;
    use crate::ActivityDraft;

    fn tag_mapper() -> ActivityMapper {
        activity_mapper(|ev| {
            let tag = ev.payload["tag"].as_str()?;
            Some(ActivityDraft::new().with_text(format!("created <{tag}>")))
        })
    }

    fn build_pipeline(
        bus: &Bus,
        mappers: HashMap<String, ActivityMapper>,
        configs: HashMap<String, ActivityConfig>,
    ) -> (ActivityPipeline, Arc<Mutex<Vec<Option<Activity>>>>) {
        let pipeline = ActivityPipeline::builder()
            .bus(bus.clone())
            .mappers(mappers)
            .configs(configs)
            .build()
            .unwrap();

        let log: Arc<Mutex<Vec<Option<Activity>>>> = Arc::new(Mutex::new(Vec::new()));
        let sink_log = Arc::clone(&log);
        pipeline.initialize(move |activity| sink_log.lock().unwrap().push(activity));
        (pipeline, log)
    }

    #[test]
    fn test_builder_requires_all_collaborators() {
        let err = ActivityPipeline::builder().build().unwrap_err();
        assert_eq!(err, BuildError::MissingBus);

        let err = ActivityPipeline::builder()
            .bus(Bus::new())
            .build()
            .unwrap_err();
        assert_eq!(err, BuildError::MissingMappers);

        let err = ActivityPipeline::builder()
            .bus(Bus::new())
            .mappers(HashMap::new())
            .build()
            .unwrap_err();
        assert_eq!(err, BuildError::MissingConfigs);
    }

    #[test]
    fn test_event_produces_activity_with_back_reference() {
        let bus = Bus::new();
        let (_pipeline, log) = build_pipeline(
            &bus,
            HashMap::from([("element.created".to_string(), tag_mapper())]),
            HashMap::from([("element.created".to_string(), ActivityConfig::default())]),
        );

        let ev = bus.emit(
            "element.created",
            serde_json::json!({ "elementId": "e1", "tag": "div" }),
        );

        let log = log.lock().unwrap();
        assert_eq!(log.len(), 1);
        let activity = log[0].as_ref().unwrap();
        assert_eq!(activity.event_id, ev.id);
        assert!(activity.text.contains("div"));
    }

    #[test]
    fn test_disabled_type_produces_nothing() {
        let bus = Bus::new();
        let (_pipeline, log) = build_pipeline(
            &bus,
            HashMap::from([("element.created".to_string(), tag_mapper())]),
            HashMap::from([(
                "element.created".to_string(),
                ActivityConfig {
                    enabled: false,
                    ..ActivityConfig::default()
                },
            )]),
        );

        bus.emit("element.created", serde_json::json!({ "tag": "div" }));
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_create_activity_false_produces_nothing() {
        let bus = Bus::new();
        let (_pipeline, log) = build_pipeline(
            &bus,
            HashMap::from([("element.created".to_string(), tag_mapper())]),
            HashMap::from([(
                "element.created".to_string(),
                ActivityConfig {
                    create_activity: false,
                    ..ActivityConfig::default()
                },
            )]),
        );

        bus.emit("element.created", serde_json::json!({ "tag": "div" }));
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_unconfigured_type_is_ignored() {
        let bus = Bus::new();
        let (_pipeline, log) = build_pipeline(
            &bus,
            HashMap::from([("element.created".to_string(), tag_mapper())]),
            HashMap::from([("element.created".to_string(), ActivityConfig::default())]),
        );

        bus.emit("element.removed", serde_json::json!({ "tag": "div" }));
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_mapper_returning_none_still_reports_observation() {
        let bus = Bus::new();
        let (_pipeline, log) = build_pipeline(
            &bus,
            HashMap::from([("element.created".to_string(), tag_mapper())]),
            HashMap::from([("element.created".to_string(), ActivityConfig::default())]),
        );

        // Payload without a tag: the mapper bails, the sink still hears.
        bus.emit("element.created", serde_json::json!({}));

        let log = log.lock().unwrap();
        assert_eq!(log.len(), 1);
        assert!(log[0].is_none());
    }

    #[test]
    fn test_config_text_fallback_when_mapper_sets_none() {
        let bus = Bus::new();
        let (_pipeline, log) = build_pipeline(
            &bus,
            HashMap::from([(
                "doc.saved".to_string(),
                activity_mapper(|_| Some(ActivityDraft::new())),
            )]),
            HashMap::from([(
                "doc.saved".to_string(),
                ActivityConfig {
                    text: Some("document saved".to_string()),
                    ..ActivityConfig::default()
                },
            )]),
        );

        bus.emit("doc.saved", serde_json::Value::Null);
        let log = log.lock().unwrap();
        assert_eq!(log[0].as_ref().unwrap().text, "document saved");
    }

    #[test]
    fn test_double_initialize_is_a_noop() {
        let bus = Bus::new();
        let (pipeline, log) = build_pipeline(
            &bus,
            HashMap::from([("element.created".to_string(), tag_mapper())]),
            HashMap::from([("element.created".to_string(), ActivityConfig::default())]),
        );
        let listeners = bus.listener_count();

        let second: Arc<Mutex<Vec<Option<Activity>>>> = Arc::new(Mutex::new(Vec::new()));
        let second_log = Arc::clone(&second);
        pipeline.initialize(move |activity| second_log.lock().unwrap().push(activity));

        assert_eq!(bus.listener_count(), listeners);
        bus.emit("element.created", serde_json::json!({ "tag": "div" }));
        assert_eq!(log.lock().unwrap().len(), 1);
        assert!(second.lock().unwrap().is_empty());
    }

    #[test]
    fn test_destroy_unsubscribes_and_is_idempotent() {
        let bus = Bus::new();
        let (pipeline, log) = build_pipeline(
            &bus,
            HashMap::from([("element.created".to_string(), tag_mapper())]),
            HashMap::from([("element.created".to_string(), ActivityConfig::default())]),
        );
        assert_eq!(bus.listener_count(), 1);

        pipeline.destroy();
        pipeline.destroy();
        assert_eq!(bus.listener_count(), 0);

        bus.emit("element.created", serde_json::json!({ "tag": "div" }));
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_sink_panic_is_swallowed() {
        let bus = Bus::new();
        let pipeline = ActivityPipeline::builder()
            .bus(bus.clone())
            .mappers(HashMap::from([("t".to_string(), tag_mapper())]))
            .configs(HashMap::from([("t".to_string(), ActivityConfig::default())]))
            .build()
            .unwrap();
        pipeline.initialize(|_| panic!("sink rejected the record"));

        // Must not propagate out of emit.
        bus.emit("t", serde_json::json!({ "tag": "div" }));
    }
}
