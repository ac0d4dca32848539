//! # One registration attempt, one fill inspection.
//!
//! The actor loops; the functions here do a single step each and publish the
//! matching event through the [`InstanceCell`].
//!
//! ## Registration
//! ```text
//! queue.is_ready()? ── no ──► Err(LibraryNotReady)             ─► LibraryNotReady
//!        │ yes
//!        ▼
//! queue.push(req)   ── Err / panic ──► Err(RegistrationThrew)  ─► RegistrationThrew
//!        │ Ok
//!        ▼
//! snapshot.register()                  ─► Registered
//! ```
//!
//! ## Inspection
//! ```text
//! detect(placeholder) ── Some(signal) ─► Filled     ─► SlotFilled
//!        │ None
//!        ├── budget used or deadline ─► TimedOut    ─► FillTimedOut
//!        └── otherwise               ─► Pending     ─► FillPending
//! ```
//!
//! ## Rules
//! - Queue access happens **inside** the cell lock, so no push can follow `cancel()`
//! - Library panics are caught and folded into `RegistrationThrew`
//! - A positive signal wins even on the last allowed check

use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::{
    core::cell::InstanceCell,
    error::{RegisterError, panic_message},
    events::{Event, EventKind},
    slot::{AdQueue, FillOutcome, FillRequest, FillSignal, Placeholder, detect},
};

/// Result of one fill inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Inspection {
    Filled { check: u32, signal: FillSignal },
    Pending { check: u32 },
    TimedOut { check: u32, reason: TimeoutReason },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TimeoutReason {
    MaxChecks,
    Deadline,
}

impl TimeoutReason {
    pub fn as_label(&self) -> &'static str {
        match self {
            TimeoutReason::MaxChecks => "max_checks",
            TimeoutReason::Deadline => "deadline",
        }
    }
}

/// Attempts to register the slot with the ad library.
///
/// Returns `None` if the instance was cancelled (nothing was attempted).
pub(crate) fn register(
    cell: &InstanceCell,
    queue: &dyn AdQueue,
) -> Option<Result<(), RegisterError>> {
    let (attempt, res) = cell.update(|snap| {
        let attempt = snap.request.attempt_count;
        let request = FillRequest {
            slot_id: snap.request.slot_id.clone(),
        };
        let pushed = catch_unwind(AssertUnwindSafe(|| {
            if !queue.is_ready() {
                return Err(RegisterError::LibraryNotReady);
            }
            queue.push(&request).map_err(RegisterError::from)
        }));
        let res = match pushed {
            Ok(Ok(())) => {
                snap.register();
                Ok(())
            }
            Ok(Err(e)) => Err(e),
            Err(panic) => Err(RegisterError::RegistrationThrew {
                reason: panic_message(panic.as_ref()),
            }),
        };
        (attempt, res)
    })?;

    match &res {
        Ok(()) => publish(cell, Event::new(EventKind::Registered), attempt),
        Err(RegisterError::LibraryNotReady) => {
            publish(cell, Event::new(EventKind::LibraryNotReady), attempt)
        }
        Err(e) => publish(
            cell,
            Event::new(EventKind::RegistrationThrew).with_reason(e.as_message()),
            attempt,
        ),
    }
    Some(res)
}

/// Inspects the placeholder once and settles the fill outcome if possible.
///
/// `budget` is the check-count cap (`None` = uncapped); `at_deadline` is true when
/// this inspection runs at the absolute fill deadline.
///
/// Returns `None` if the instance was cancelled or is not polling.
pub(crate) fn inspect(
    cell: &InstanceCell,
    placeholder: &dyn Placeholder,
    budget: Option<u32>,
    at_deadline: bool,
) -> Option<Inspection> {
    let signal = detect(placeholder);

    let inspection = cell.update(|snap| {
        let fill = snap.fill.as_mut()?;
        if fill.outcome != FillOutcome::Pending {
            return None;
        }
        let check = fill.record_check();

        if let Some(signal) = signal {
            fill.settle(FillOutcome::Filled);
            return Some(Inspection::Filled { check, signal });
        }
        let reason = if budget.is_some_and(|max| check >= max) {
            Some(TimeoutReason::MaxChecks)
        } else if at_deadline {
            Some(TimeoutReason::Deadline)
        } else {
            None
        };
        match reason {
            Some(reason) => {
                fill.settle(FillOutcome::TimedOut);
                Some(Inspection::TimedOut { check, reason })
            }
            None => Some(Inspection::Pending { check }),
        }
    })??;

    let ev = match inspection {
        Inspection::Filled { check, signal } => Event::new(EventKind::SlotFilled)
            .with_check(check)
            .with_signal(signal),
        Inspection::Pending { check } => Event::new(EventKind::FillPending).with_check(check),
        Inspection::TimedOut { check, reason } => Event::new(EventKind::FillTimedOut)
            .with_check(check)
            .with_reason(reason.as_label()),
    };
    cell.emit(ev);
    Some(inspection)
}

fn publish(cell: &InstanceCell, ev: Event, attempt: u32) {
    cell.emit(ev.with_attempt(attempt));
}
