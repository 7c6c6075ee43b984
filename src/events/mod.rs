//! Domain events: the record type and the synchronous bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to domain events emitted by the application.
//!
//! ## Contents
//! - [`Event`], [`RecordKind`] record shape and classification
//! - [`Bus`] typed synchronous dispatcher
//! - [`Subscription`] idempotent de-registration guard
//!
//! ## Quick reference
//! - **Publishers**: any application code holding a [`Bus`] clone.
//! - **Consumers**: [`ActivityPipeline`](crate::ActivityPipeline) and
//!   [`Notifier`](crate::Notifier), each wiring one handler per configured
//!   event type.

mod bus;
mod event;

pub use bus::{Bus, Subscription};
pub use event::{Event, RecordKind};
