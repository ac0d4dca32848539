//! # InstanceCell: guarded state of one slot instance.
//!
//! Every mutation of an instance's [`SlotSnapshot`], every event it publishes and
//! every push into the ad library goes through the cell. The cell checks the
//! instance's [`CancellationToken`] **under the same lock** that [`InstanceCell::cancel`]
//! takes, so once `cancel()` returns nothing from that instance can change state,
//! publish, or touch the queue again.
//!
//! ```text
//! actor ──► update(|snap| ..) ──┐
//! actor ──► emit(Event)      ───┼──► lock ──► token cancelled? ──► yes: reject (None/false)
//! host  ──► cancel()         ───┘                               └─► no: apply, mirror to watch
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::events::{Bus, Event, EventKind};
use crate::slot::SlotSnapshot;

pub(crate) struct InstanceCell {
    token: CancellationToken,
    state: Mutex<SlotSnapshot>,
    watch: watch::Sender<Option<SlotSnapshot>>,
    bus: Bus,
}

impl InstanceCell {
    /// Creates the cell and mirrors its initial snapshot to `watch`.
    pub fn new(
        snapshot: SlotSnapshot,
        watch: watch::Sender<Option<SlotSnapshot>>,
        bus: Bus,
    ) -> Arc<Self> {
        watch.send_replace(Some(snapshot.clone()));
        Arc::new(Self {
            token: CancellationToken::new(),
            state: Mutex::new(snapshot),
            watch,
            bus,
        })
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn snapshot(&self) -> SlotSnapshot {
        self.lock().clone()
    }

    /// Applies `f` to the snapshot unless the instance was cancelled.
    ///
    /// Returns `None` when cancelled; `f` is not called in that case.
    pub fn update<R>(&self, f: impl FnOnce(&mut SlotSnapshot) -> R) -> Option<R> {
        let mut state = self.lock();
        if self.token.is_cancelled() {
            return None;
        }
        let out = f(&mut state);
        self.watch.send_replace(Some(state.clone()));
        Some(out)
    }

    /// Publishes `ev` unless the instance was cancelled.
    pub fn emit(&self, ev: Event) -> bool {
        let state = self.lock();
        if self.token.is_cancelled() {
            return false;
        }
        self.bus.publish(ev.with_slot(state.request.slot_id.clone()));
        true
    }

    /// Cancels the instance. Returns `false` if it already was.
    ///
    /// A terminal snapshot keeps its phase and publishes nothing; only a live one
    /// is marked cancelled and announced.
    pub fn cancel(&self) -> bool {
        let mut state = self.lock();
        if self.token.is_cancelled() {
            return false;
        }
        self.token.cancel();
        if state.is_terminal() {
            return true;
        }
        state.cancelled = true;
        self.watch.send_replace(Some(state.clone()));
        self.bus.publish(
            Event::new(EventKind::SlotCancelled)
                .with_slot(state.request.slot_id.clone())
                .with_route(state.route.clone()),
        );
        true
    }

    fn lock(&self) -> MutexGuard<'_, SlotSnapshot> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::SlotPhase;

    fn cell() -> (Arc<InstanceCell>, watch::Receiver<Option<SlotSnapshot>>, Bus) {
        let (tx, rx) = watch::channel(None);
        let bus = Bus::new(16);
        let cell = InstanceCell::new(SlotSnapshot::new("s1", "/en"), tx, bus.clone());
        (cell, rx, bus)
    }

    #[test]
    fn test_initial_snapshot_is_mirrored() {
        let (_cell, rx, _bus) = cell();
        let snap = rx.borrow().clone().expect("snapshot");
        assert_eq!(snap.slot_id(), "s1");
        assert_eq!(snap.phase(), SlotPhase::Registering);
    }

    #[test]
    fn test_no_mutation_after_cancel() {
        let (cell, rx, _bus) = cell();
        assert_eq!(cell.update(|s| s.register()), Some(true));
        assert!(cell.cancel());
        assert!(!cell.cancel());

        let mut called = false;
        assert_eq!(
            cell.update(|s| {
                called = true;
                s.exhausted = true;
            }),
            None
        );
        assert!(!called);
        assert!(!cell.emit(Event::new(EventKind::FillPending)));

        let snap = rx.borrow().clone().expect("snapshot");
        assert!(snap.cancelled);
        assert!(!snap.exhausted);
        assert_eq!(snap.phase(), SlotPhase::Cancelled);
    }

    #[tokio::test]
    async fn test_emit_tags_slot_and_cancel_publishes_once() {
        let (cell, _rx, bus) = cell();
        let mut events = bus.subscribe();

        assert!(cell.emit(Event::new(EventKind::LibraryNotReady).with_attempt(0)));
        cell.cancel();
        cell.cancel();

        let first = events.recv().await.expect("event");
        assert_eq!(first.kind, EventKind::LibraryNotReady);
        assert_eq!(first.slot.as_deref(), Some("s1"));

        let second = events.recv().await.expect("event");
        assert_eq!(second.kind, EventKind::SlotCancelled);
        assert_eq!(second.route.as_deref(), Some("/en"));
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_cancel_after_terminal_keeps_phase_silently() {
        let (cell, rx, bus) = cell();
        let mut events = bus.subscribe();
        cell.update(|s| s.exhausted = true);

        assert!(cell.cancel());
        assert!(events.try_recv().is_err());
        let snap = rx.borrow().clone().expect("snapshot");
        assert!(!snap.cancelled);
        assert_eq!(snap.phase(), SlotPhase::Exhausted);
    }
}
