//! # Generic mapper/config table.
//!
//! [`Registry`] pairs two string-keyed tables: per-event-type **mappers**
//! (pure functions turning an event into a draft record, or `None`) and
//! per-event-type **config** records (declarative settings, never mutated at
//! runtime). The pipelines are open/closed over this table: new event types
//! are wired by adding entries, never by modifying pipeline logic.
//!
//! ## Fallback mapper
//! The reserved key [`DEFAULT_MAPPER`] supplies a mapper for event types that
//! have a config entry but no bespoke mapper. [`Registry::mapper`] resolves
//! bespoke-then-default; config lookup is always exact-match.

use std::collections::HashMap;

/// Reserved mapper-table key supplying the fallback mapper.
pub const DEFAULT_MAPPER: &str = "default";

/// Paired mapper and config tables, keyed by event type.
///
/// `M` is the mapper type (an `Arc`'d closure alias), `C` the config record.
/// Supplied at construction time and read-only afterwards.
pub struct Registry<M, C> {
    mappers: HashMap<String, M>,
    configs: HashMap<String, C>,
}

impl<M, C> Registry<M, C> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            mappers: HashMap::new(),
            configs: HashMap::new(),
        }
    }

    /// Builds a registry from pre-assembled tables.
    pub fn from_tables(mappers: HashMap<String, M>, configs: HashMap<String, C>) -> Self {
        Self { mappers, configs }
    }

    /// Adds a bespoke mapper for one event type.
    #[must_use]
    pub fn with_mapper(mut self, event_type: impl Into<String>, mapper: M) -> Self {
        self.mappers.insert(event_type.into(), mapper);
        self
    }

    /// Adds the fallback mapper under the reserved [`DEFAULT_MAPPER`] key.
    #[must_use]
    pub fn with_default_mapper(self, mapper: M) -> Self {
        self.with_mapper(DEFAULT_MAPPER, mapper)
    }

    /// Adds a config record for one event type.
    #[must_use]
    pub fn with_config(mut self, event_type: impl Into<String>, config: C) -> Self {
        self.configs.insert(event_type.into(), config);
        self
    }

    /// Resolves the mapper for an event type: bespoke entry first, then the
    /// [`DEFAULT_MAPPER`] fallback, then `None`.
    pub fn mapper(&self, event_type: &str) -> Option<&M> {
        self.mappers
            .get(event_type)
            .or_else(|| self.mappers.get(DEFAULT_MAPPER))
    }

    /// Exact-match config lookup. No fallback: an event type without a config
    /// entry is not handled by the owning pipeline.
    pub fn config(&self, event_type: &str) -> Option<&C> {
        self.configs.get(event_type)
    }

    /// The subscription set: every event type present in either table, with
    /// the reserved [`DEFAULT_MAPPER`] key excluded. Sorted and deduplicated
    /// so subscription wiring is deterministic.
    pub fn event_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self
            .configs
            .keys()
            .chain(self.mappers.keys())
            .map(String::as_str)
            .filter(|t| *t != DEFAULT_MAPPER)
            .collect();
        types.sort_unstable();
        types.dedup();
        types
    }

    /// True if both tables are empty.
    pub fn is_empty(&self) -> bool {
        self.mappers.is_empty() && self.configs.is_empty()
    }
}

impl<M, C> Default for Registry<M, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M, C> std::fmt::Debug for Registry<M, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("mappers", &self.mappers.len())
            .field("configs", &self.configs.len())
            .finish()
    }
}
