//! # Event subscribers for slot lifecycles.
//!
//! This module provides the [`Subscribe`] trait, the fan-out [`SubscriberSet`]
//! and the built-in [`LogWriter`] (feature `logging`).
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   SlotActor ── publish(Event) ──► Bus ──► subscriber_listener ──► SubscriberSet::emit
//!                                                                        │
//!                                                           ┌────────────┼───────────┐
//!                                                           ▼            ▼           ▼
//!                                                       LogWriter    Metrics      Custom
//! ```

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
