//! # herald
//!
//! **Herald** is the event signaling layer of a visual editor: a
//! process-local publish/subscribe bus plus two downstream pipelines that
//! turn raw domain events into user-facing records — permanent **activity**
//! log entries and transient, stateful **notifications**.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │   Producer   │   │   Producer   │   │   Producer   │
//!     │ (editor code)│   │ (store layer)│   │  (anything)  │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            └──────────────────┼──────────────────┘
//!                               ▼ emit(type, payload)
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Bus (synchronous fan-out, per-type handler lists)                │
//! │  - assigns event identity and timestamps                          │
//! │  - dispatches in subscription order, isolating handler panics     │
//! └──────────────┬──────────────────────────────────┬─────────────────┘
//!                ▼                                  ▼
//!     ┌────────────────────┐             ┌────────────────────────┐
//!     │  ActivityPipeline  │             │        Notifier        │
//!     │  config gate       │             │  config gate           │
//!     │  mapper lookup     │             │  mapper lookup         │
//!     │  (per-type table,  │             │  auto-dismiss timers   │
//!     │   "default" key)   │             │  show/dismiss/read     │
//!     └─────────┬──────────┘             └───────────┬────────────┘
//!               ▼ Option<Activity>                   ▼ NotifyAction
//!          external sink                        external sink
//!        (application store — not part of this crate)
//! ```
//!
//! ### Notification lifecycle
//! ```text
//! Visible ──┬─ timer fires ──┬─ persistent ──► Hidden     (kept in sink)
//!           │                └─ temporary  ──► Removed    (deleted)
//!           ├─ dismiss()    ──┬─ persistent ──► Dismissed (kept in sink)
//!           │                 └─ temporary  ──► Removed
//!           └─ read()       ──────────────────► Removed   (always)
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types                                   |
//! |-------------------|---------------------------------------------------------------|---------------------------------------------|
//! | **Bus**           | Typed synchronous publish/subscribe with panic isolation.     | [`Bus`], [`Subscription`], [`Event`]        |
//! | **Registries**    | Per-event-type mappers and declarative configs.               | [`Registry`], [`ActivityConfig`], [`NotificationConfig`] |
//! | **Activities**    | Immutable history records pushed to a sink.                   | [`Activity`], [`ActivityPipeline`]          |
//! | **Notifications** | Stateful alerts with timers and retention.                    | [`Notification`], [`Notifier`], [`NotifyAction`] |
//! | **Errors**        | Fail-fast construction faults.                                | [`BuildError`]                              |
//!
//! ## Example
//! ```no_run
//! use std::collections::HashMap;
//! use herald::{
//!     activity_mapper, notify_mapper, ActivityConfig, ActivityDraft, ActivityPipeline,
//!     Bus, NotificationConfig, NotificationDraft, Notifier, Severity,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let bus = Bus::new();
//!
//!     let activities = ActivityPipeline::builder()
//!         .bus(bus.clone())
//!         .mappers(HashMap::from([(
//!             "element.created".to_string(),
//!             activity_mapper(|ev| {
//!                 let tag = ev.payload["tag"].as_str()?;
//!                 Some(ActivityDraft::new().with_text(format!("created <{tag}>")))
//!             }),
//!         )]))
//!         .configs(HashMap::from([(
//!             "element.created".to_string(),
//!             ActivityConfig::default(),
//!         )]))
//!         .build()
//!         .expect("bus, mappers and configs supplied");
//!     activities.initialize(|activity| {
//!         // forward to the application store
//!         let _ = activity;
//!     });
//!
//!     let notifier = Notifier::builder()
//!         .bus(bus.clone())
//!         .mappers(HashMap::from([(
//!             "export.finished".to_string(),
//!             notify_mapper(|_| {
//!                 Some(NotificationDraft::new()
//!                     .with_severity(Severity::Success)
//!                     .with_text("export finished"))
//!             }),
//!         )]))
//!         .configs(HashMap::from([(
//!             "export.finished".to_string(),
//!             NotificationConfig::default(),
//!         )]))
//!         .build()
//!         .expect("bus, mappers and configs supplied");
//!     notifier.initialize(|action| {
//!         // forward to the application store
//!         let _ = action;
//!     });
//!
//!     bus.emit("element.created", serde_json::json!({ "tag": "div" }));
//!     bus.emit("export.finished", serde_json::json!({ "pages": 3 }));
//!
//!     activities.destroy();
//!     notifier.destroy();
//! }
//! ```
//!
//! ## Scope
//! In-process only: no cross-process delivery, no durability or replay, no
//! back-pressure, no ordering across independent producers beyond
//! single-dispatch FIFO. The sink (application store), UI rendering and
//! persistence adapters are external collaborators reached through the
//! callback contracts above.

mod activity;
mod error;
mod events;
mod notify;
mod registry;

// ---- Public re-exports ----

pub use activity::{Activity, ActivityDraft, ActivityPipeline, ActivityPipelineBuilder};
pub use error::BuildError;
pub use events::{Bus, Event, RecordKind, Subscription};
pub use notify::{
    Notification, NotificationDraft, NotificationState, Notifier, NotifierBuilder, NotifyAction,
    Severity,
};
pub use registry::{
    activity_mapper, notify_mapper, ActivityConfig, ActivityMapper, ActivityRegistry,
    NotificationConfig, NotifyMapper, NotifyRegistry, Registry, DEFAULT_DURATION, DEFAULT_MAPPER,
};
