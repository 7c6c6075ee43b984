//! Error types for pipeline construction.
//!
//! This crate fails fast: the only fallible surface is building a pipeline
//! without one of its three required collaborators (bus, mapper table,
//! config table). Everything downstream is absorbed and logged, never
//! returned (see the crate docs for the full error-handling table).

use thiserror::Error;

/// # Errors produced when assembling a pipeline.
///
/// Returned by [`ActivityPipelineBuilder::build`](crate::ActivityPipelineBuilder::build)
/// and [`NotifierBuilder::build`](crate::NotifierBuilder::build) when a
/// required collaborator was never supplied. Construction is the only place
/// these surface; a successfully built pipeline does not error at runtime.
#[non_exhaustive]
#[derive(Error, Debug, PartialEq, Eq)]
pub enum BuildError {
    /// No event bus was supplied.
    #[error("event bus is required")]
    MissingBus,

    /// No mapper table was supplied.
    #[error("mapper table is required")]
    MissingMappers,

    /// No config table was supplied.
    #[error("config table is required")]
    MissingConfigs,
}

impl BuildError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use herald::BuildError;
    ///
    /// assert_eq!(BuildError::MissingBus.as_label(), "missing_bus");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            BuildError::MissingBus => "missing_bus",
            BuildError::MissingMappers => "missing_mappers",
            BuildError::MissingConfigs => "missing_configs",
        }
    }
}
