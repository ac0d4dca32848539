//! # SlotActor: one slot instance's lifecycle.
//!
//! Drives one [`InstanceCell`] from "not yet requested" to a terminal state:
//! - registration retries with a fixed delay, bounded by `max_registration_retries`,
//! - fill polling at a fixed interval, bounded by a check cap and/or an absolute deadline,
//! - cooperative cancellation via the cell's [`CancellationToken`](tokio_util::sync::CancellationToken).
//!
//! ## Event flow
//! ```text
//! SlotStarted
//!   → LibraryNotReady | RegistrationThrew → RetryScheduled → [sleep] → (next attempt)
//!   → RegistrationExhausted                                   (retry cap hit)
//!   → Registered
//!       → [sleep] → FillPending → [sleep] → ...
//!       → SlotFilled | FillTimedOut
//! ```
//!
//! ## Architecture
//! ```text
//! loop {                                   // registration
//!   ├─► runner::register() ── Ok ──► break
//!   │        └─ Err ──► begin_retry()
//!   │                     ├─► None    → exhausted, exit
//!   │                     └─► Some(n) → publish RetryScheduled, sleep(retry_delay)
//! }
//! deadline = now + absolute_timeout
//! loop {                                   // fill detection
//!   ├─► sleep_until(min(now + poll_interval, deadline))
//!   └─► runner::inspect()
//!         ├─► Filled / TimedOut → exit
//!         └─► Pending           → continue
//! }
//! ```
//!
//! ## Rules
//! - Registration **strictly precedes** polling
//! - Steps run **sequentially**; the next sleep is armed only after the previous step
//! - Every sleep races the cancellation token; cancellation drops the timer and exits

use std::{sync::Arc, time::Duration};

use tokio::{select, time};

use crate::{
    config::Config,
    core::{
        cell::InstanceCell,
        runner::{self, Inspection},
    },
    events::{Event, EventKind},
    slot::{AdQueue, Placeholder},
};

/// Timing parameters extracted from [`Config`].
#[derive(Clone, Copy, Debug)]
pub(crate) struct SlotActorParams {
    pub retry_delay: Duration,
    pub max_retries: u32,
    pub poll_interval: Duration,
    pub poll_budget: Option<u32>,
    pub fill_deadline: Option<Duration>,
}

impl From<&Config> for SlotActorParams {
    fn from(cfg: &Config) -> Self {
        Self {
            retry_delay: cfg.retry_delay,
            max_retries: cfg.max_registration_retries,
            poll_interval: cfg.poll_interval,
            poll_budget: cfg.poll_budget(),
            fill_deadline: cfg.fill_deadline(),
        }
    }
}

/// How an actor finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ActorExit {
    Filled,
    TimedOut,
    Exhausted,
    Cancelled,
}

pub(crate) struct SlotActor {
    pub cell: Arc<InstanceCell>,
    pub queue: Arc<dyn AdQueue>,
    pub placeholder: Arc<dyn Placeholder>,
    pub params: SlotActorParams,
}

impl SlotActor {
    /// Runs the instance until a terminal state or cancellation.
    pub async fn run(self) -> ActorExit {
        match self.register().await {
            Ok(()) => self.poll_fill().await,
            Err(exit) => exit,
        }
    }

    /// Registration loop. Returns `Ok` once registered.
    async fn register(&self) -> Result<(), ActorExit> {
        loop {
            let err = match runner::register(&self.cell, self.queue.as_ref()) {
                None => return Err(ActorExit::Cancelled),
                Some(Ok(())) => return Ok(()),
                Some(Err(e)) => e,
            };

            let max = self.params.max_retries;
            let Some(next) = self.cell.update(|snap| {
                let next = snap.request.begin_retry(max);
                if next.is_none() {
                    snap.exhausted = true;
                }
                next
            }) else {
                return Err(ActorExit::Cancelled);
            };

            let Some(retry) = next else {
                self.cell.emit(
                    Event::new(EventKind::RegistrationExhausted)
                        .with_attempt(max)
                        .with_reason(err.as_label()),
                );
                return Err(ActorExit::Exhausted);
            };

            self.cell.emit(
                Event::new(EventKind::RetryScheduled)
                    .with_attempt(retry)
                    .with_delay(self.params.retry_delay)
                    .with_reason(err.as_label()),
            );
            if !self.sleep(time::Instant::now() + self.params.retry_delay).await {
                return Err(ActorExit::Cancelled);
            }
        }
    }

    /// Fill-detection loop, started right after registration.
    async fn poll_fill(&self) -> ActorExit {
        let deadline = self
            .params
            .fill_deadline
            .map(|d| time::Instant::now() + d);

        loop {
            let mut wake = time::Instant::now() + self.params.poll_interval;
            if let Some(dl) = deadline {
                wake = wake.min(dl);
            }
            if !self.sleep(wake).await {
                return ActorExit::Cancelled;
            }

            let at_deadline = deadline.is_some_and(|dl| time::Instant::now() >= dl);
            match runner::inspect(
                &self.cell,
                self.placeholder.as_ref(),
                self.params.poll_budget,
                at_deadline,
            ) {
                None => return ActorExit::Cancelled,
                Some(Inspection::Filled { .. }) => return ActorExit::Filled,
                Some(Inspection::TimedOut { .. }) => return ActorExit::TimedOut,
                Some(Inspection::Pending { .. }) => continue,
            }
        }
    }

    /// Sleeps until `at`. Returns `false` if cancelled first.
    async fn sleep(&self, at: time::Instant) -> bool {
        let sleep = time::sleep_until(at);
        tokio::pin!(sleep);
        select! {
            _ = &mut sleep => true,
            _ = self.cell.token().cancelled() => false,
        }
    }
}
