//! # siderail
//!
//! **siderail** drives third-party ad slots ("side-rail ads") from "not yet
//! requested" to a settled visible/hidden state.
//!
//! The ad library loads asynchronously and never says when it is ready, nor
//! whether it actually rendered anything into a slot. A controller therefore
//! retries registration with a bounded budget, then polls the placeholder for
//! DOM-visible evidence of content until a check cap or an absolute deadline.
//! Every failure is silent to the page: the slot simply ends up hidden.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!        host: slot id, class name, route signal
//!                        │
//!                        ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  AdSlotController (one per placeholder)                           │
//! │  - start / cancel / reset / navigate / shutdown                   │
//! │  - watch<SlotSnapshot> (visibility for the host)                  │
//! │  - Bus (broadcast events) ──► SubscriberSet ──► LogWriter, ...    │
//! └──────┬──────────────────────────────────────────────────┬─────────┘
//!        ▼                                                  │
//!  ┌──────────────┐   push(FillRequest)   ┌──────────────┐  │
//!  │  SlotActor   │ ────────────────────► │   AdQueue    │  │
//!  │ (one per     │                       │ (library's   │  │
//!  │  instance)   │ ◄──── detect() ────── │  Placeholder)│  │
//!  └──────────────┘                       └──────────────┘  │
//!        │ InstanceCell (state guarded by the cancel token) │
//!        └──────────────────────────────────────────────────┘
//! ```
//!
//! ### Lifecycle
//! ```text
//! start(slot) ──► SlotActor::run()
//!
//! loop {                                        // registration
//!   ├─► queue ready? push request
//!   │     ├─ Ok           ─► Registered, break
//!   │     └─ not ready / threw
//!   │           ├─ retries left ─► RetryScheduled, sleep(retry_delay) (cancellable)
//!   │           └─ exhausted    ─► RegistrationExhausted, hidden, exit
//! }
//! loop {                                        // fill detection
//!   ├─► sleep(poll_interval, capped at deadline) (cancellable)
//!   └─► inspect placeholder: height > 0 | status=done | fill=filled
//!         ├─ positive               ─► SlotFilled, visible, exit
//!         ├─ checks used / deadline ─► FillTimedOut, hidden, exit
//!         └─ otherwise              ─► FillPending, continue
//! }
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                       |
//! |-------------------|---------------------------------------------------------------|------------------------------------------|
//! | **Controller**    | Per-placeholder lifecycle, idempotent start, safe cancel.     | [`AdSlotController`]                     |
//! | **Capabilities**  | Injected library queue and placeholder probe.                 | [`AdQueue`], [`Placeholder`]             |
//! | **State**         | Registration/fill state and derived visibility.               | [`SlotSnapshot`], [`FillOutcome`]        |
//! | **Subscriber API**| Hook into lifecycle events (logging, metrics, ...).           | [`Subscribe`], [`Event`]                 |
//! | **Errors**        | Typed registration and configuration errors.                  | [`RegisterError`], [`ConfigError`]       |
//! | **Configuration** | Timing constants, client id, placeholder height.              | [`Config`]                               |
//!
//! ## Optional features
//! - `logging` (default): exports [`LogWriter`], which renders events through `tracing`.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use siderail::{AdSlotController, Config, MemoryPlaceholder, SharedQueue};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let queue = Arc::new(SharedQueue::new());
//!     let placeholder = Arc::new(MemoryPlaceholder::new());
//!
//!     let ctrl = AdSlotController::builder(Config::default())
//!         .build(queue.clone(), placeholder.clone())?;
//!
//!     assert!(ctrl.start("4075355245"));
//!     assert!(!ctrl.start("4075355245")); // idempotent
//!     assert!(ctrl.visible());            // visible until proven empty
//!
//!     ctrl.shutdown().await;
//!     Ok(())
//! }
//! ```
mod config;
mod core;
mod error;
mod events;
mod slot;
mod subscribers;

// ---- Public re-exports ----

pub use config::{Config, DEFAULT_CLIENT_ID};
pub use crate::core::{AdSlotController, ControllerBuilder, INITIAL_ROUTE};
pub use error::{ConfigError, PushError, RegisterError};
pub use events::{Bus, Event, EventKind};
pub use slot::{
    AdQueue, Anchor, FILL_ATTR, FILL_FILLED, FillCheck, FillOutcome, FillRequest, FillSignal,
    MemoryPlaceholder, Placeholder, STATUS_ATTR, STATUS_DONE, SharedQueue, SlotPhase, SlotRequest,
    SlotSnapshot, detect,
};
pub use subscribers::{Subscribe, SubscriberSet};

// Built-in logger subscriber.
// Disable with: `--no-default-features`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
