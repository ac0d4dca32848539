//! # Per-instance slot state.
//!
//! [`SlotRequest`] tracks registration, [`FillCheck`] tracks fill detection, and
//! [`SlotSnapshot`] bundles both for the host together with derived visibility.
//!
//! ## Rules
//! - `registered` flips false→true at most once per instance
//! - a [`FillCheck`] exists only once `registered` is true
//! - [`FillOutcome`] is monotonic: `Pending` → `Filled` | `TimedOut`
//!
//! Transitions are methods here; callers never poke at fields directly, so the
//! rules above hold wherever the state is mutated.

use std::sync::Arc;

/// Registration side of one slot instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlotRequest {
    /// Opaque slot id supplied by the host.
    pub slot_id: Arc<str>,
    /// Registration retries used so far (the initial attempt is not a retry).
    pub attempt_count: u32,
    /// True once the library accepted the fill request.
    pub registered: bool,
}

impl SlotRequest {
    /// Fresh request: no retries, not registered.
    pub fn new(slot_id: impl Into<Arc<str>>) -> Self {
        Self {
            slot_id: slot_id.into(),
            attempt_count: 0,
            registered: false,
        }
    }

    /// Consumes one retry from the budget.
    ///
    /// Returns the retry number (1-based), or `None` once `max` retries are used.
    pub fn begin_retry(&mut self, max: u32) -> Option<u32> {
        if self.registered || self.attempt_count >= max {
            return None;
        }
        self.attempt_count += 1;
        Some(self.attempt_count)
    }

    /// Marks the request accepted. Returns `false` if it already was.
    pub fn mark_registered(&mut self) -> bool {
        if self.registered {
            return false;
        }
        self.registered = true;
        true
    }
}

/// Result of fill detection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FillOutcome {
    /// Still polling.
    Pending,
    /// Evidence of content was observed.
    Filled,
    /// Checks or deadline ran out without evidence.
    TimedOut,
}

/// Fill-detection side of one slot instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FillCheck {
    /// Checks performed so far.
    pub check_count: u32,
    /// Current outcome.
    pub outcome: FillOutcome,
}

impl FillCheck {
    pub(crate) fn new() -> Self {
        Self {
            check_count: 0,
            outcome: FillOutcome::Pending,
        }
    }

    /// Counts one check and returns its 1-based number.
    pub(crate) fn record_check(&mut self) -> u32 {
        self.check_count += 1;
        self.check_count
    }

    /// Settles the outcome. Returns `false` if it was already settled.
    pub(crate) fn settle(&mut self, outcome: FillOutcome) -> bool {
        if self.outcome != FillOutcome::Pending || outcome == FillOutcome::Pending {
            return false;
        }
        self.outcome = outcome;
        true
    }
}

/// Coarse lifecycle position, derived from a [`SlotSnapshot`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotPhase {
    /// Waiting for the library queue.
    Registering,
    /// Registered, checking the placeholder for content.
    Polling,
    /// Content observed.
    Filled,
    /// Registered but no content observed in time.
    TimedOut,
    /// Registration retries exhausted.
    Exhausted,
    /// Cancelled by the host before reaching a terminal state.
    Cancelled,
}

/// Observable state of one slot instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlotSnapshot {
    /// Host route this instance was started for.
    pub route: Arc<str>,
    /// Registration state.
    pub request: SlotRequest,
    /// Fill state; `None` until registered.
    pub fill: Option<FillCheck>,
    /// Registration gave up without ever registering.
    pub exhausted: bool,
    /// The host cancelled this instance.
    pub cancelled: bool,
}

impl SlotSnapshot {
    /// Fresh snapshot for a newly started instance.
    pub fn new(slot_id: impl Into<Arc<str>>, route: impl Into<Arc<str>>) -> Self {
        Self {
            route: route.into(),
            request: SlotRequest::new(slot_id),
            fill: None,
            exhausted: false,
            cancelled: false,
        }
    }

    /// Slot id of this instance.
    pub fn slot_id(&self) -> &str {
        &self.request.slot_id
    }

    /// Current fill outcome, if registered.
    pub fn outcome(&self) -> Option<FillOutcome> {
        self.fill.map(|f| f.outcome)
    }

    /// Whether the placeholder should be shown.
    ///
    /// Visible by default so that a quick fill does not flicker; hidden once fill
    /// detection timed out or registration was exhausted.
    pub fn visible(&self) -> bool {
        !self.exhausted && self.outcome() != Some(FillOutcome::TimedOut)
    }

    /// True once no further transitions can happen.
    pub fn is_terminal(&self) -> bool {
        self.phase() != SlotPhase::Registering && self.phase() != SlotPhase::Polling
    }

    /// Derived lifecycle position.
    pub fn phase(&self) -> SlotPhase {
        match (self.exhausted, self.outcome()) {
            (true, _) => SlotPhase::Exhausted,
            (_, Some(FillOutcome::Filled)) => SlotPhase::Filled,
            (_, Some(FillOutcome::TimedOut)) => SlotPhase::TimedOut,
            _ if self.cancelled => SlotPhase::Cancelled,
            (_, Some(FillOutcome::Pending)) => SlotPhase::Polling,
            (_, None) => SlotPhase::Registering,
        }
    }

    /// Registers the request and opens fill detection.
    pub(crate) fn register(&mut self) -> bool {
        if !self.request.mark_registered() {
            return false;
        }
        self.fill = Some(FillCheck::new());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_budget_is_capped() {
        let mut req = SlotRequest::new("s");
        assert_eq!(req.begin_retry(2), Some(1));
        assert_eq!(req.begin_retry(2), Some(2));
        assert_eq!(req.begin_retry(2), None);
        assert_eq!(req.attempt_count, 2);
    }

    #[test]
    fn test_register_only_once() {
        let mut snap = SlotSnapshot::new("s", "/");
        assert!(snap.fill.is_none());
        assert!(snap.register());
        assert!(!snap.register());
        assert_eq!(snap.phase(), SlotPhase::Polling);
        assert_eq!(snap.request.begin_retry(5), None);
    }

    #[test]
    fn test_outcome_is_monotonic() {
        let mut fill = FillCheck::new();
        assert!(!fill.settle(FillOutcome::Pending));
        assert!(fill.settle(FillOutcome::Filled));
        assert!(!fill.settle(FillOutcome::TimedOut));
        assert_eq!(fill.outcome, FillOutcome::Filled);
    }

    #[test]
    fn test_visibility_derivation() {
        let mut snap = SlotSnapshot::new("s", "/");
        assert!(snap.visible());

        snap.register();
        assert!(snap.visible());

        if let Some(fill) = snap.fill.as_mut() {
            fill.settle(FillOutcome::TimedOut);
        }
        assert!(!snap.visible());
        assert_eq!(snap.phase(), SlotPhase::TimedOut);
        assert!(snap.is_terminal());

        let mut exhausted = SlotSnapshot::new("s", "/");
        exhausted.exhausted = true;
        assert!(!exhausted.visible());
        assert_eq!(exhausted.phase(), SlotPhase::Exhausted);
    }

    #[test]
    fn test_cancelled_mid_poll_phase() {
        let mut snap = SlotSnapshot::new("s", "/");
        snap.register();
        snap.cancelled = true;
        assert_eq!(snap.phase(), SlotPhase::Cancelled);
        assert!(snap.visible());
    }
}
