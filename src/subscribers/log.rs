//! # LogWriter: event logger
//!
//! A subscriber that renders incoming [`Event`]s through `tracing`. Install any
//! `tracing` subscriber (e.g. `tracing_subscriber::fmt`) in the host to see them.
//!
//! ## Example output
//! ```text
//! INFO  [slot-started] slot="4075355245" route="/en"
//! DEBUG [not-ready] slot="4075355245" attempt=0
//! DEBUG [retry] slot="4075355245" delay_ms=300 attempt=1 reason="library_not_ready"
//! INFO  [registered] slot="4075355245" attempt=3
//! DEBUG [fill-pending] slot="4075355245" check=1
//! INFO  [filled] slot="4075355245" check=4 signal=Height(250)
//! WARN  [timed-out] slot="4075355245" checks=20 reason="max_checks"
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let slot = e.slot.as_deref().unwrap_or("?");
        let reason = e.reason.as_deref().unwrap_or("");
        match e.kind {
            EventKind::SlotStarted => {
                tracing::info!("[slot-started] slot={slot:?} route={:?}", e.route);
            }
            EventKind::LibraryNotReady => {
                tracing::debug!("[not-ready] slot={slot:?} attempt={:?}", e.attempt);
            }
            EventKind::RegistrationThrew => {
                tracing::debug!(
                    "[push-threw] slot={slot:?} attempt={:?} err={reason:?}",
                    e.attempt
                );
            }
            EventKind::RetryScheduled => {
                tracing::debug!(
                    "[retry] slot={slot:?} delay_ms={:?} attempt={:?} reason={reason:?}",
                    e.delay_ms,
                    e.attempt
                );
            }
            EventKind::Registered => {
                tracing::info!("[registered] slot={slot:?} attempt={:?}", e.attempt);
            }
            EventKind::FillPending => {
                tracing::debug!("[fill-pending] slot={slot:?} check={:?}", e.check);
            }
            EventKind::SlotFilled => {
                tracing::info!(
                    "[filled] slot={slot:?} check={:?} signal={:?}",
                    e.check,
                    e.signal
                );
            }
            EventKind::FillTimedOut => {
                tracing::warn!(
                    "[timed-out] slot={slot:?} checks={:?} reason={reason:?}",
                    e.check
                );
            }
            EventKind::RegistrationExhausted => {
                tracing::warn!(
                    "[exhausted] slot={slot:?} attempt={:?} last={reason:?}",
                    e.attempt
                );
            }
            EventKind::SlotCancelled => {
                tracing::info!("[cancelled] slot={slot:?} route={:?}", e.route);
            }
            EventKind::SubscriberOverflow => {
                tracing::warn!("[subscriber-overflow] subscriber={slot} reason={reason}");
            }
            EventKind::SubscriberPanicked => {
                tracing::error!("[subscriber-panicked] subscriber={slot} info={reason}");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
