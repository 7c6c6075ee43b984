//! # Event bus: typed, synchronous publish/subscribe.
//!
//! [`Bus`] dispatches events to handlers registered per event type. Dispatch
//! is fully synchronous: every handler registered for the emitted type runs
//! to completion, in subscription order, before [`Bus::emit`] returns.
//!
//! ## Architecture
//! ```text
//! Producers (many):                  Handlers (per type, in order):
//!   editor code ──┐
//!   store layer ──┼──► emit(type, payload) ──► handler #1 ──► handler #2 ──► ...
//!   pipelines   ──┘       (constructs Event,      (panics caught and logged,
//!                          assigns id + time)      dispatch continues)
//! ```
//!
//! ## Rules
//! - **Exact-type matching**: no wildcard subscriptions.
//! - **FIFO per type**: synchronous dispatch means events of one type reach a
//!   handler in emission order; nothing is buffered or reordered.
//! - **Isolation**: a panicking handler never prevents later handlers from
//!   seeing the same event. The panic is caught inside the bus and logged.
//! - **No delivery guarantee** beyond "all currently-registered handlers for
//!   this type are called once before `emit` returns".
//!
//! ## Reentrancy
//! The handler list is snapshotted before dispatch, so a handler may freely
//! call [`Bus::on`], [`Bus::emit`] or [`Subscription::unsubscribe`]; list
//! mutations take effect for subsequent emits, not the one in flight.
//!
//! ## Example
//! ```rust
//! use herald::Bus;
//!
//! let bus = Bus::new();
//! let sub = bus.on("doc.saved", |ev| {
//!     assert_eq!(ev.event_type, "doc.saved");
//! });
//!
//! let ev = bus.emit("doc.saved", serde_json::json!({ "path": "a.svg" }));
//! assert_eq!(ev.payload["path"], "a.svg");
//!
//! sub.unsubscribe();
//! assert_eq!(bus.listener_count(), 0);
//! ```

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex, Weak};

use super::event::Event;

type Handler = Arc<dyn Fn(&Event) + Send + Sync + 'static>;

/// One registered handler; `id` preserves subscription order within a type.
struct Registered {
    id: u64,
    handler: Handler,
}

struct BusInner {
    handlers: Mutex<HashMap<String, Vec<Registered>>>,
    next_id: AtomicU64,
}

/// Typed synchronous publish/subscribe dispatcher.
///
/// Cheap to clone (internally an `Arc`-backed handle); all clones share the
/// same handler table.
#[derive(Clone)]
pub struct Bus {
    inner: Arc<BusInner>,
}

impl Bus {
    /// Creates an empty bus.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(BusInner {
                handlers: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    /// Registers a handler for one exact event type.
    ///
    /// Multiple handlers may register for the same type; all are invoked in
    /// subscription order. The returned [`Subscription`] de-registers the
    /// handler via [`Subscription::unsubscribe`]; dropping the guard without
    /// calling it leaves the handler registered (use [`Bus::clear`] for full
    /// teardown).
    #[must_use = "dropping the guard keeps the handler registered; keep it to unsubscribe later"]
    pub fn on<F>(&self, event_type: impl Into<String>, handler: F) -> Subscription
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        let event_type = event_type.into();
        let id = self.inner.next_id.fetch_add(1, AtomicOrdering::Relaxed);

        let mut handlers = self.inner.handlers.lock().unwrap();
        handlers.entry(event_type.clone()).or_default().push(Registered {
            id,
            handler: Arc::new(handler),
        });

        Subscription {
            bus: Arc::downgrade(&self.inner),
            event_type,
            id,
        }
    }

    /// Constructs a new [`Event`] and synchronously fans it out.
    ///
    /// The event gets a fresh id and current timestamps; the payload is
    /// attached verbatim. Every handler registered for `event_type` runs to
    /// completion, in subscription order, before this returns. A handler that
    /// panics is caught and logged; the remaining handlers still run.
    ///
    /// Returns the constructed event (also the value handlers observed).
    pub fn emit(&self, event_type: impl Into<String>, payload: serde_json::Value) -> Event {
        let event = Event::new(event_type, payload);

        // Snapshot under the lock, dispatch outside it: handlers may
        // re-enter the bus.
        let snapshot: Vec<Handler> = {
            let handlers = self.inner.handlers.lock().unwrap();
            handlers
                .get(&event.event_type)
                .map(|regs| regs.iter().map(|r| Arc::clone(&r.handler)).collect())
                .unwrap_or_default()
        };

        for handler in snapshot {
            if let Err(panic) = catch_unwind(AssertUnwindSafe(|| handler(&event))) {
                tracing::error!(
                    event_id = event.id,
                    event_type = %event.event_type,
                    ?panic,
                    "event handler panicked; continuing dispatch"
                );
            }
        }

        event
    }

    /// Total number of registered handlers, across all types.
    pub fn listener_count(&self) -> usize {
        let handlers = self.inner.handlers.lock().unwrap();
        handlers.values().map(Vec::len).sum()
    }

    /// Removes all handlers. Used for test isolation and full teardown.
    pub fn clear(&self) {
        self.inner.handlers.lock().unwrap().clear();
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Bus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bus")
            .field("listener_count", &self.listener_count())
            .finish()
    }
}

/// De-registration guard returned by [`Bus::on`].
///
/// [`Subscription::unsubscribe`] is idempotent: the first call removes the
/// handler, later calls (and calls after [`Bus::clear`]) are no-ops. The
/// guard holds only a weak reference, so it never keeps a bus alive.
#[derive(Debug)]
pub struct Subscription {
    bus: Weak<BusInner>,
    event_type: String,
    id: u64,
}

impl Subscription {
    /// Removes the handler this guard was created for, if still registered.
    pub fn unsubscribe(&self) {
        let Some(inner) = self.bus.upgrade() else {
            return;
        };
        let mut handlers = inner.handlers.lock().unwrap();
        if let Some(regs) = handlers.get_mut(&self.event_type) {
            regs.retain(|r| r.id != self.id);
            if regs.is_empty() {
                handlers.remove(&self.event_type);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn collect_bus() -> (Bus, Arc<Mutex<Vec<String>>>) {
        (Bus::new(), Arc::new(Mutex::new(Vec::new())))
    }

    #[test]
    fn test_handlers_run_in_subscription_order() {
        let (bus, seen) = collect_bus();
        for tag in ["first", "second", "third"] {
            let seen = Arc::clone(&seen);
            let _keep = bus.on("t", move |_| seen.lock().unwrap().push(tag.to_string()));
        }

        bus.emit("t", serde_json::Value::Null);
        assert_eq!(*seen.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_exact_type_matching_only() {
        let (bus, seen) = collect_bus();
        let seen2 = Arc::clone(&seen);
        let _keep = bus.on("a.b", move |ev| seen2.lock().unwrap().push(ev.event_type.clone()));

        bus.emit("a.b", serde_json::Value::Null);
        bus.emit("a", serde_json::Value::Null);
        bus.emit("a.b.c", serde_json::Value::Null);

        assert_eq!(*seen.lock().unwrap(), vec!["a.b"]);
    }

    #[test]
    fn test_panicking_handler_does_not_stop_dispatch() {
        let bus = Bus::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let _a = bus.on("t", |_| panic!("boom"));
        let hits2 = Arc::clone(&hits);
        let _b = bus.on("t", move |_| {
            hits2.fetch_add(1, AtomicOrdering::SeqCst);
        });

        bus.emit("t", serde_json::Value::Null);
        assert_eq!(hits.load(AtomicOrdering::SeqCst), 1);
    }

    #[test]
    fn test_unsubscribe_is_idempotent() {
        let (bus, seen) = collect_bus();
        let seen2 = Arc::clone(&seen);
        let sub = bus.on("t", move |_| seen2.lock().unwrap().push("hit".into()));

        sub.unsubscribe();
        sub.unsubscribe();
        bus.emit("t", serde_json::Value::Null);

        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn test_listener_count_and_clear() {
        let bus = Bus::new();
        let _a = bus.on("x", |_| {});
        let _b = bus.on("x", |_| {});
        let _c = bus.on("y", |_| {});
        assert_eq!(bus.listener_count(), 3);

        bus.clear();
        assert_eq!(bus.listener_count(), 0);

        // Unsubscribing after clear is a no-op, not an error.
        _a.unsubscribe();
    }

    #[test]
    fn test_emit_returns_the_dispatched_event() {
        let bus = Bus::new();
        let seen_id = Arc::new(Mutex::new(None));
        let seen2 = Arc::clone(&seen_id);
        let _keep = bus.on("t", move |ev| {
            *seen2.lock().unwrap() = Some(ev.id);
        });

        let ev = bus.emit("t", serde_json::json!({ "n": 1 }));
        assert_eq!(*seen_id.lock().unwrap(), Some(ev.id));
        assert_eq!(ev.payload["n"], 1);
    }

    #[test]
    fn test_handler_may_register_another_handler() {
        let bus = Bus::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let bus2 = bus.clone();
        let hits2 = Arc::clone(&hits);
        let _outer = bus.on("t", move |_| {
            let hits3 = Arc::clone(&hits2);
            let _inner = bus2.on("t", move |_| {
                hits3.fetch_add(1, AtomicOrdering::SeqCst);
            });
        });

        // The inner handler is registered mid-dispatch and must not see the
        // event that registered it.
        bus.emit("t", serde_json::Value::Null);
        assert_eq!(hits.load(AtomicOrdering::SeqCst), 0);

        bus.emit("t", serde_json::Value::Null);
        assert_eq!(hits.load(AtomicOrdering::SeqCst), 1);
    }

    #[test]
    fn test_fifo_per_type_across_emits() {
        let (bus, seen) = collect_bus();
        let seen2 = Arc::clone(&seen);
        let _keep = bus.on("t", move |ev| {
            seen2.lock().unwrap().push(ev.payload["n"].to_string());
        });

        for n in 0..5 {
            bus.emit("t", serde_json::json!({ "n": n }));
        }
        assert_eq!(*seen.lock().unwrap(), vec!["0", "1", "2", "3", "4"]);
    }
}
