//! # Notifier: the notification lifecycle manager.
//!
//! [`Notifier`] owns the only real state machine in this crate. It creates
//! notifications from bus events (via its mapper/config registry), runs
//! auto-dismiss timers, and exposes the manual `show`/`dismiss`/`read`
//! operations. Every outcome is pushed to the sink as a
//! [`NotifyAction`]; the sink's store is never read back.
//!
//! ## Lifecycle
//! ```text
//! event ──► mapper ──► Add ──┬─ timer fires ──┬─ persistent ──► Hide     (kept, hidden)
//!                            │                └─ temporary  ──► Remove   (deleted)
//!                            ├─ dismiss()    ──┬─ persistent ──► Dismiss (kept)
//!                            │                 └─ temporary  ──► Remove  (deleted)
//!                            └─ read()       ──────────────────► Read    (always removed)
//!
//! show(draft) ──► Add ──► timer fires ──► dismiss()  ──► Remove
//!                         (manual path: never Hide, see below)
//! ```
//!
//! ## Bookkeeping
//! One entry per live notification holds the pending [`TimerHandle`] (at
//! most one) and the originating event type. Persistence is re-derived from
//! the origin's config whenever a timer fires or a manual action arrives,
//! never cached. Manually shown notifications have no origin and therefore
//! always resolve as temporary, on both expiry and manual dismissal; callers
//! that need a persistent manual notification must route it through the
//! event path.
//!
//! ## Rules
//! - Timers need a tokio runtime: call [`Notifier::initialize`] and
//!   [`Notifier::show`] from within one.
//! - Sink panics are caught, logged with the offending id, and swallowed;
//!   bookkeeping still completes, so no timer is left dangling.
//! - `dismiss`/`read` with an unknown id are no-ops.
//! - With no sink registered, actions are dropped (logged at debug level);
//!   the manager may legitimately be built before the sink is ready.
//!
//! ## Example
//! ```no_run
//! use std::collections::HashMap;
//! use herald::{notify_mapper, Bus, NotificationConfig, NotificationDraft, Notifier, Severity};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let bus = Bus::new();
//!     let notifier = Notifier::builder()
//!         .bus(bus.clone())
//!         .mappers(HashMap::from([(
//!             "export.finished".to_string(),
//!             notify_mapper(|ev| {
//!                 Some(NotificationDraft::new()
//!                     .with_severity(Severity::Success)
//!                     .with_text(format!("{} done", ev.event_type)))
//!             }),
//!         )]))
//!         .configs(HashMap::from([(
//!             "export.finished".to_string(),
//!             NotificationConfig::default(),
//!         )]))
//!         .build()
//!         .unwrap();
//!
//!     notifier.initialize(|action| {
//!         println!("sink: {}", action.as_label());
//!     });
//!
//!     bus.emit("export.finished", serde_json::json!({ "pages": 3 }));
//!     notifier.success("saved");
//! }
//! ```

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::BuildError;
use crate::events::{Bus, Event, Subscription};
use crate::notify::{NotificationDraft, Notification, NotifyAction, Severity};
use crate::notify::timer::TimerHandle;
use crate::registry::{NotificationConfig, NotifyMapper, NotifyRegistry, DEFAULT_DURATION};

type NotifySink = Arc<dyn Fn(NotifyAction) + Send + Sync>;

/// Which path a firing timer takes.
#[derive(Clone, Copy)]
enum TimerMode {
    /// Event-driven auto-dismiss: branches on persistence (Hide vs Remove).
    Auto,
    /// `show()` timer: calls `dismiss` directly, so it resolves through the
    /// manual path and never hides.
    Manual,
}

/// Bookkeeping for one live notification.
///
/// `timer` is present only while an auto-dismiss is pending; `origin` is
/// present from creation until read or removal, and only for event-driven
/// notifications.
struct NotificationEntry {
    timer: Option<TimerHandle>,
    origin: Option<String>,
}

struct NotifierInner {
    bus: Bus,
    registry: NotifyRegistry,
    sink: Mutex<Option<NotifySink>>,
    entries: Mutex<HashMap<String, NotificationEntry>>,
    subscriptions: Mutex<Vec<Subscription>>,
}

/// Notification lifecycle manager.
///
/// Built from its three required collaborators (bus, mapper table, config
/// table); wired to the bus by [`Notifier::initialize`] and torn down by
/// [`Notifier::destroy`]. Cheap to clone; all clones share state.
#[derive(Clone)]
pub struct Notifier {
    inner: Arc<NotifierInner>,
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier").finish_non_exhaustive()
    }
}

impl Notifier {
    /// Starts building a notifier.
    pub fn builder() -> NotifierBuilder {
        NotifierBuilder::new()
    }

    /// Registers the sink and subscribes to every configured event type.
    ///
    /// One-time: a second call without an intervening
    /// [`destroy`](Self::destroy) is a no-op with a warning, and the first
    /// registration wins.
    pub fn initialize<F>(&self, sink: F)
    where
        F: Fn(NotifyAction) + Send + Sync + 'static,
    {
        {
            let mut slot = self.inner.sink.lock().unwrap();
            if slot.is_some() {
                tracing::warn!("notifier already initialized; ignoring this call");
                return;
            }
            *slot = Some(Arc::new(sink));
        }

        let mut subs = self.inner.subscriptions.lock().unwrap();
        for event_type in self.inner.registry.event_types() {
            let inner = Arc::clone(&self.inner);
            subs.push(
                self.inner
                    .bus
                    .on(event_type, move |ev| NotifierInner::on_event(&inner, ev)),
            );
        }
    }

    /// Creates and shows a notification directly, bypassing the event path.
    ///
    /// Missing draft fields are defaulted (generated id, [`Severity::Info`],
    /// empty title/text). The draft's `duration` (default
    /// [`DEFAULT_DURATION`], `ZERO` = no timer) schedules a timer whose
    /// firing dismisses the notification through the manual path, so
    /// manually shown notifications always resolve as temporary.
    ///
    /// Returns the synthesized record. With no sink registered the record is
    /// returned but nothing is tracked or dispatched.
    pub fn show(&self, draft: NotificationDraft) -> Notification {
        NotifierInner::show(&self.inner, draft)
    }

    /// Dismisses a notification: cancels its pending timer, then either
    /// keeps it in the sink (`Dismiss`, persistent origin) or deletes it
    /// (`Remove`). Unknown ids are no-ops.
    pub fn dismiss(&self, id: &str) {
        self.inner.dismiss(id);
    }

    /// Marks a notification read: cancels its pending timer and removes it
    /// from the visible set regardless of persistence. Unknown ids (and
    /// repeated reads) are no-ops.
    pub fn read(&self, id: &str) {
        self.inner.read(id);
    }

    /// Shows a [`Severity::Success`] notification with the given text.
    pub fn success(&self, text: impl Into<String>) -> Notification {
        self.show(NotificationDraft::new().with_severity(Severity::Success).with_text(text))
    }

    /// Shows a [`Severity::Error`] notification with the given text.
    pub fn error(&self, text: impl Into<String>) -> Notification {
        self.show(NotificationDraft::new().with_severity(Severity::Error).with_text(text))
    }

    /// Shows a [`Severity::Warning`] notification with the given text.
    pub fn warning(&self, text: impl Into<String>) -> Notification {
        self.show(NotificationDraft::new().with_severity(Severity::Warning).with_text(text))
    }

    /// Shows a [`Severity::Info`] notification with the given text.
    pub fn info(&self, text: impl Into<String>) -> Notification {
        self.show(NotificationDraft::new().with_severity(Severity::Info).with_text(text))
    }

    /// Cancels every pending timer, clears all bookkeeping, unsubscribes
    /// from the bus and drops the sink. Safe to call multiple times; after
    /// it returns the notifier can be initialized again.
    pub fn destroy(&self) {
        {
            let mut subs = self.inner.subscriptions.lock().unwrap();
            for sub in subs.drain(..) {
                sub.unsubscribe();
            }
        }
        {
            let mut entries = self.inner.entries.lock().unwrap();
            for (_, entry) in entries.drain() {
                if let Some(timer) = entry.timer {
                    timer.cancel();
                }
            }
        }
        *self.inner.sink.lock().unwrap() = None;
    }

    /// Number of notifications with a pending auto-dismiss timer.
    pub fn pending_timers(&self) -> usize {
        let entries = self.inner.entries.lock().unwrap();
        entries.values().filter(|e| e.timer.is_some()).count()
    }

    /// Number of notifications currently tracked (live bookkeeping entries).
    pub fn tracked(&self) -> usize {
        self.inner.entries.lock().unwrap().len()
    }
}

impl NotifierInner {
    fn on_event(this: &Arc<Self>, event: &Event) {
        let Some(config) = this.registry.config(&event.event_type) else {
            return;
        };
        if !config.enabled {
            return;
        }
        let Some(draft) = this.registry.mapper(&event.event_type).and_then(|m| m(event))
        else {
            return;
        };

        if this.sink.lock().unwrap().is_none() {
            tracing::debug!(
                event_id = event.id,
                event_type = %event.event_type,
                "no notification sink registered; dropping event"
            );
            return;
        }

        let duration = config.duration;
        let notification = Notification::from_draft(draft, Some(event));
        let id = notification.id.clone();

        this.track(id.clone(), Some(event.event_type.clone()));

        this.dispatch(NotifyAction::Add {
            payload: notification,
        });

        if !duration.is_zero() {
            Self::schedule_timer(this, id, duration, TimerMode::Auto);
        }
    }

    fn show(this: &Arc<Self>, draft: NotificationDraft) -> Notification {
        let duration = draft.duration.unwrap_or(DEFAULT_DURATION);
        let notification = Notification::from_draft(draft, None);

        if this.sink.lock().unwrap().is_none() {
            tracing::debug!(id = %notification.id, "no notification sink registered; dropping show");
            return notification;
        }

        let id = notification.id.clone();
        this.track(id.clone(), None);

        this.dispatch(NotifyAction::Add {
            payload: notification.clone(),
        });

        if !duration.is_zero() {
            Self::schedule_timer(this, id, duration, TimerMode::Manual);
        }
        notification
    }

    /// Inserts a fresh bookkeeping entry for `id`.
    ///
    /// A caller-supplied id may collide with a live entry; the displaced
    /// entry's timer is cancelled so the stale task cannot fire against the
    /// new entry.
    fn track(&self, id: String, origin: Option<String>) {
        let displaced = self.entries.lock().unwrap().insert(
            id,
            NotificationEntry {
                timer: None,
                origin,
            },
        );
        if let Some(prev) = displaced {
            if let Some(timer) = prev.timer {
                timer.cancel();
            }
        }
    }

    /// Spawns the auto-dismiss task and stores its handle in the entry.
    ///
    /// The sink runs between entry insertion and this call and may already
    /// have dismissed the notification; in that case the fresh timer is
    /// cancelled instead of stored.
    fn schedule_timer(this: &Arc<Self>, id: String, duration: Duration, mode: TimerMode) {
        let token = CancellationToken::new();
        let task_token = token.clone();
        let inner = Arc::clone(this);
        let task_id = id.clone();

        let join = tokio::spawn(async move {
            tokio::select! {
                _ = task_token.cancelled() => {}
                _ = tokio::time::sleep(duration) => match mode {
                    TimerMode::Auto => inner.expire(&task_id),
                    TimerMode::Manual => inner.dismiss(&task_id),
                },
            }
        });

        let handle = TimerHandle::new(token, join);
        let mut entries = this.entries.lock().unwrap();
        match entries.get_mut(&id) {
            Some(entry) => entry.timer = Some(handle),
            None => handle.cancel(),
        }
    }

    /// Auto-dismiss path: runs only while the entry still holds its timer.
    fn expire(&self, id: &str) {
        let action = {
            let mut entries = self.entries.lock().unwrap();
            let Some(entry) = entries.get_mut(id) else {
                return;
            };
            if entry.timer.take().is_none() {
                return;
            }
            if self.is_persistent(entry) {
                NotifyAction::Hide { id: id.to_string() }
            } else {
                entries.remove(id);
                NotifyAction::Remove { id: id.to_string() }
            }
        };
        self.dispatch(action);
    }

    fn dismiss(&self, id: &str) {
        let action = {
            let mut entries = self.entries.lock().unwrap();
            let Some(entry) = entries.get_mut(id) else {
                tracing::debug!(id, "dismiss for unknown notification; ignoring");
                return;
            };
            if let Some(timer) = entry.timer.take() {
                timer.cancel();
            }
            if self.is_persistent(entry) {
                NotifyAction::Dismiss { id: id.to_string() }
            } else {
                entries.remove(id);
                NotifyAction::Remove { id: id.to_string() }
            }
        };
        self.dispatch(action);
    }

    fn read(&self, id: &str) {
        let Some(entry) = self.entries.lock().unwrap().remove(id) else {
            tracing::debug!(id, "read for unknown notification; ignoring");
            return;
        };
        if let Some(timer) = entry.timer {
            timer.cancel();
        }
        self.dispatch(NotifyAction::Read { id: id.to_string() });
    }

    /// Re-derives persistence from the origin's config. No origin (manual
    /// notifications) or no config entry resolves as temporary.
    fn is_persistent(&self, entry: &NotificationEntry) -> bool {
        entry
            .origin
            .as_deref()
            .and_then(|event_type| self.registry.config(event_type))
            .map(|config| config.persistent)
            .unwrap_or(false)
    }

    /// Invokes the sink outside every lock; panics are caught and logged.
    fn dispatch(&self, action: NotifyAction) {
        let sink = self.sink.lock().unwrap().clone();
        let Some(sink) = sink else {
            tracing::debug!(
                action = action.as_label(),
                id = action.id(),
                "no notification sink registered; dropping action"
            );
            return;
        };

        let label = action.as_label();
        let id = action.id().to_string();
        if let Err(panic) = catch_unwind(AssertUnwindSafe(|| sink(action))) {
            tracing::error!(action = label, id = %id, ?panic, "notification sink panicked");
        }
    }
}

/// Builder for [`Notifier`].
///
/// All three collaborators are required; [`build`](Self::build) fails fast
/// on the first missing one.
#[derive(Default)]
pub struct NotifierBuilder {
    bus: Option<Bus>,
    mappers: Option<HashMap<String, NotifyMapper>>,
    configs: Option<HashMap<String, NotificationConfig>>,
}

impl NotifierBuilder {
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
    pub fn mappers(mut self, mappers: HashMap<String, NotifyMapper>) -> Self {
        self.mappers = Some(mappers);
        self
    }

    /// Sets the config table (event type → [`NotificationConfig`]).
    #[must_use]
    pub fn configs(mut self, configs: HashMap<String, NotificationConfig>) -> Self {
        self.configs = Some(configs);
        self
    }

    /// Builds the notifier, failing on the first missing collaborator.
    pub fn build(self) -> Result<Notifier, BuildError> {
        let bus = self.bus.ok_or(BuildError::MissingBus)?;
        let mappers = self.mappers.ok_or(BuildError::MissingMappers)?;
        let configs = self.configs.ok_or(BuildError::MissingConfigs)?;

        Ok(Notifier {
            inner: Arc::new(NotifierInner {
                bus,
                registry: NotifyRegistry::from_tables(mappers, configs),
                sink: Mutex::new(None),
                entries: Mutex::new(HashMap::new()),
                subscriptions: Mutex::new(Vec::new()),
            }),
        })
    }
}
