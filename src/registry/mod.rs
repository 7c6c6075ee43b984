//! Mapper/config registries: pure per-event-type dispatch tables.
//!
//! One [`Registry`] instance per pipeline, each pairing declarative config
//! records with pure mapper functions. Supplied at construction time by the
//! caller and read-only afterwards; new event types are wired by adding
//! table entries, never by modifying pipeline logic.
//!
//! ## Contents
//! - [`Registry`], [`DEFAULT_MAPPER`] the generic two-table structure
//! - [`ActivityConfig`], [`ActivityMapper`], [`ActivityRegistry`]
//! - [`NotificationConfig`], [`NotifyMapper`], [`NotifyRegistry`]

mod activity;
mod notify;
mod table;

pub use activity::{activity_mapper, ActivityConfig, ActivityMapper, ActivityRegistry};
pub use notify::{notify_mapper, NotificationConfig, NotifyMapper, NotifyRegistry, DEFAULT_DURATION};
pub use table::{Registry, DEFAULT_MAPPER};
