//! # Lifecycle events emitted by slot instances.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Registration events**: attempts against the ad library queue
//! - **Fill events**: polling the placeholder for evidence of content
//! - **Terminal events**: the instance's final state (filled, timed out, exhausted, cancelled)
//!
//! The [`Event`] struct carries additional metadata such as timestamps, slot id,
//! attempt/check counters, reasons and delays.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use siderail::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::RetryScheduled)
//!     .with_slot("4075355245")
//!     .with_reason("library_not_ready")
//!     .with_attempt(3)
//!     .with_delay(Duration::from_millis(300));
//!
//! assert_eq!(ev.kind, EventKind::RetryScheduled);
//! assert_eq!(ev.slot.as_deref(), Some("4075355245"));
//! assert_eq!(ev.delay_ms, Some(300));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use crate::slot::FillSignal;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `slot`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `slot`: subscriber name
    /// - `reason`: reason string (e.g., "full", "closed")
    SubscriberOverflow,

    // === Registration events ===
    /// A fresh instance started for a placement.
    ///
    /// Sets:
    /// - `slot`: slot id
    /// - `route`: host route the instance belongs to
    SlotStarted,

    /// Registration attempt found the queue absent or unusable.
    ///
    /// Sets:
    /// - `slot`, `attempt`: retries used so far (0 = initial attempt)
    LibraryNotReady,

    /// Registration attempt reached the queue but the push raised.
    ///
    /// Sets:
    /// - `slot`, `attempt`
    /// - `reason`: failure message
    RegistrationThrew,

    /// Next registration attempt scheduled.
    ///
    /// Sets:
    /// - `slot`
    /// - `attempt`: number of the upcoming retry (1-based)
    /// - `delay_ms`: delay before it runs
    /// - `reason`: label of the failure that caused it
    RetryScheduled,

    /// Library accepted the fill request; fill detection begins.
    ///
    /// Sets:
    /// - `slot`, `attempt`: retries it took
    Registered,

    /// A fill check found no evidence of content.
    ///
    /// Sets:
    /// - `slot`, `check`: 1-based check number
    FillPending,

    // === Terminal states ===
    /// A fill check found content.
    ///
    /// Sets:
    /// - `slot`, `check`
    /// - `signal`: which evidence matched first
    SlotFilled,

    /// Fill detection ran out of checks or hit the absolute deadline.
    ///
    /// Sets:
    /// - `slot`, `check`: checks performed
    /// - `reason`: `"max_checks"` or `"deadline"`
    FillTimedOut,

    /// Registration retry cap exhausted without ever registering.
    ///
    /// Sets:
    /// - `slot`, `attempt`
    /// - `reason`: label of the last failure
    RegistrationExhausted,

    /// Instance cancelled by the host (unmount or navigation).
    ///
    /// Sets:
    /// - `slot`, `route`
    SlotCancelled,
}

/// Lifecycle event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Slot id (or subscriber name for subscriber events).
    pub slot: Option<Arc<str>>,
    /// Host route of the placement.
    pub route: Option<Arc<str>>,
    /// Registration retries used.
    pub attempt: Option<u32>,
    /// Fill check number.
    pub check: Option<u32>,
    /// Delay before the next attempt in milliseconds (compact).
    pub delay_ms: Option<u32>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
    /// Fill evidence that ended polling.
    pub signal: Option<FillSignal>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            slot: None,
            route: None,
            attempt: None,
            check: None,
            delay_ms: None,
            reason: None,
            signal: None,
        }
    }

    /// Attaches a slot id.
    #[inline]
    pub fn with_slot(mut self, slot: impl Into<Arc<str>>) -> Self {
        self.slot = Some(slot.into());
        self
    }

    /// Attaches a host route.
    #[inline]
    pub fn with_route(mut self, route: impl Into<Arc<str>>) -> Self {
        self.route = Some(route.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a registration attempt count.
    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches a fill check number.
    #[inline]
    pub fn with_check(mut self, n: u32) -> Self {
        self.check = Some(n);
        self
    }

    /// Attaches a delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.delay_ms = Some(ms);
        self
    }

    /// Attaches the fill evidence.
    #[inline]
    pub fn with_signal(mut self, signal: FillSignal) -> Self {
        self.signal = Some(signal);
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_slot(subscriber)
            .with_reason(reason)
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_slot(subscriber)
            .with_reason(info)
    }

    /// True for events that end an instance.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.kind,
            EventKind::SlotFilled
                | EventKind::FillTimedOut
                | EventKind::RegistrationExhausted
                | EventKind::SlotCancelled
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seq_is_monotonic() {
        let a = Event::new(EventKind::SlotStarted);
        let b = Event::new(EventKind::Registered);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_delay_saturates() {
        let ev = Event::new(EventKind::RetryScheduled).with_delay(Duration::from_secs(u64::MAX));
        assert_eq!(ev.delay_ms, Some(u32::MAX));
    }

    #[test]
    fn test_terminal_kinds() {
        assert!(Event::new(EventKind::SlotFilled).is_terminal());
        assert!(Event::new(EventKind::SlotCancelled).is_terminal());
        assert!(!Event::new(EventKind::FillPending).is_terminal());
    }

    #[test]
    fn test_overflow_reason_is_bare() {
        let ev = Event::subscriber_overflow("log", "full");
        assert_eq!(ev.kind, EventKind::SubscriberOverflow);
        assert_eq!(ev.slot.as_deref(), Some("log"));
        assert_eq!(ev.reason.as_deref(), Some("full"));
    }
}
