//! Slot lifecycle core.
//!
//! The only public API from this module is [`AdSlotController`] (and its
//! [`ControllerBuilder`]), which owns one placeholder's instances.
//!
//! Internal modules:
//! - [`cell`]: guarded per-instance state; rejects everything after cancel;
//! - [`runner`]: one registration attempt / one fill inspection, with events;
//! - [`actor`]: the sequential registration → fill-detection loop of one instance;
//! - [`controller`]: start/cancel/reset/navigate and host-facing state;
//! - [`builder`]: config validation and subscriber wiring.

mod actor;
mod builder;
mod cell;
mod controller;
mod runner;

pub use builder::ControllerBuilder;
pub use controller::{AdSlotController, INITIAL_ROUTE};

impl AdSlotController {
    /// Returns a builder for a controller with the given configuration.
    pub fn builder(cfg: crate::Config) -> ControllerBuilder {
        ControllerBuilder::new(cfg)
    }
}
