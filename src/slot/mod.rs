//! # Slot data model and external capabilities.
//!
//! - [`SlotRequest`], [`FillCheck`], [`SlotSnapshot`] per-instance state
//! - [`AdQueue`] push-only sink into the ad library ([`SharedQueue`] in-memory impl)
//! - [`Placeholder`] read-only probe of the placeholder element ([`MemoryPlaceholder`])
//! - [`Anchor`] placeholder markup for the host

mod anchor;
mod model;
mod placeholder;
mod queue;

pub use anchor::Anchor;
pub use model::{FillCheck, FillOutcome, SlotPhase, SlotRequest, SlotSnapshot};
pub use placeholder::{
    FILL_ATTR, FILL_FILLED, FillSignal, MemoryPlaceholder, Placeholder, STATUS_ATTR, STATUS_DONE,
    detect,
};
pub use queue::{AdQueue, FillRequest, SharedQueue};
