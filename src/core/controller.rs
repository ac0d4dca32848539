//! # AdSlotController: one placeholder, many instances over its lifetime.
//!
//! The controller is what the host holds for one rendered placeholder. Each mount
//! (and each distinct navigation target) runs a fresh **instance**: a new
//! [`SlotSnapshot`], a new [`InstanceCell`], and a spawned [`SlotActor`].
//!
//! ## Lifecycle
//! ```text
//! start(slot) ──► instance #1 ──► Registering ──► Polling ──► Filled | TimedOut
//!                     │                └──► Exhausted
//!                     │
//! navigate(route) / reset(slot)
//!                     ├─► cancel #1      (no further mutation from #1)
//!                     └─► instance #2    (awaits #1's task before its first step)
//!
//! shutdown() ──► cancel current ──► await its task ──► stop route listener
//! ```
//!
//! ## Rules
//! - `start` is **idempotent**: while an instance exists and is not cancelled, it is a no-op
//! - At most **one** live instance per controller; the placeholder is never shared
//! - A new instance never takes its first step before the previous instance's task
//!   has finished, so no timer of the old instance outlives the switch
//! - Visibility is derived from the current instance's snapshot (visible before any)

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::{
    config::Config,
    core::{
        actor::{ActorExit, SlotActor, SlotActorParams},
        cell::InstanceCell,
    },
    events::{Bus, Event, EventKind},
    slot::{AdQueue, Anchor, Placeholder, SlotSnapshot},
};

/// Route assumed until the host reports one.
pub const INITIAL_ROUTE: &str = "/";

/// Handle to a running (or finished) instance.
struct Instance {
    cell: Arc<InstanceCell>,
    join: JoinHandle<ActorExit>,
}

struct Placement {
    route: Arc<str>,
    current: Option<Instance>,
}

/// Drives one ad placeholder through registration and fill detection.
///
/// Build with [`AdSlotController::builder`].
pub struct AdSlotController {
    cfg: Config,
    bus: Bus,
    queue: Arc<dyn AdQueue>,
    placeholder: Arc<dyn Placeholder>,
    placement: Mutex<Placement>,
    snapshots: watch::Sender<Option<SlotSnapshot>>,
    lifetime: CancellationToken,
}

impl AdSlotController {
    pub(crate) fn new_internal(
        cfg: Config,
        bus: Bus,
        queue: Arc<dyn AdQueue>,
        placeholder: Arc<dyn Placeholder>,
        lifetime: CancellationToken,
    ) -> Arc<Self> {
        let (snapshots, _rx) = watch::channel(None);
        Arc::new(Self {
            cfg,
            bus,
            queue,
            placeholder,
            placement: Mutex::new(Placement {
                route: Arc::from(INITIAL_ROUTE),
                current: None,
            }),
            snapshots,
            lifetime,
        })
    }

    /// Starts the lifecycle for `slot_id` on the current route.
    ///
    /// Safe to call before the ad library has loaded. Returns `false` (and does
    /// nothing) while an instance exists that was not cancelled, whatever its slot
    /// id; use [`AdSlotController::reset`] to switch placements.
    pub fn start(&self, slot_id: &str) -> bool {
        let mut placement = self.lock();
        if placement
            .current
            .as_ref()
            .is_some_and(|inst| !inst.cell.is_cancelled())
        {
            return false;
        }
        self.spawn_instance(&mut placement, slot_id);
        true
    }

    /// Cancels the current instance.
    ///
    /// After return no timer of that instance fires into state, no event is
    /// published for it and the ad library queue is not touched by it again.
    /// Returns `false` if there was nothing live to cancel.
    pub fn cancel(&self) -> bool {
        let placement = self.lock();
        placement
            .current
            .as_ref()
            .is_some_and(|inst| inst.cell.cancel())
    }

    /// Re-arms the lifecycle for `slot_id`: cancels the current instance and
    /// starts a fresh one on the current route.
    pub fn reset(&self, slot_id: &str) {
        let mut placement = self.lock();
        if let Some(inst) = placement.current.as_ref() {
            inst.cell.cancel();
        }
        self.spawn_instance(&mut placement, slot_id);
    }

    /// Reports a host navigation.
    ///
    /// A different route re-arms the current slot for the new placement; the same
    /// route is ignored. Before the first `start`, or after `cancel`, it only
    /// records the route. Returns `true` if an instance was re-armed.
    pub fn navigate(&self, route: &str) -> bool {
        let mut placement = self.lock();
        if *placement.route == *route {
            return false;
        }
        placement.route = Arc::from(route);

        let Some(inst) = placement
            .current
            .as_ref()
            .filter(|inst| !inst.cell.is_cancelled())
        else {
            return false;
        };
        inst.cell.cancel();
        let slot_id = inst.cell.snapshot().request.slot_id;
        self.spawn_instance(&mut placement, &slot_id);
        true
    }

    /// Follows the host's route signal until [`AdSlotController::shutdown`] or drop.
    ///
    /// Each change of the watched value is forwarded to [`AdSlotController::navigate`].
    pub fn follow_route(self: &Arc<Self>, mut routes: watch::Receiver<String>) -> JoinHandle<()> {
        let me: Weak<Self> = Arc::downgrade(self);
        let lifetime = self.lifetime.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = lifetime.cancelled() => break,
                    changed = routes.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let route = routes.borrow_and_update().clone();
                        match me.upgrade() {
                            Some(ctrl) => { ctrl.navigate(&route); }
                            None => break,
                        }
                    }
                }
            }
        })
    }

    /// Unmounts the placeholder: cancels the current instance, waits for its
    /// task to finish, and stops the route and event listeners.
    pub async fn shutdown(&self) {
        let join = {
            let mut placement = self.lock();
            placement.current.take().map(|inst| {
                inst.cell.cancel();
                inst.join
            })
        };
        if let Some(join) = join {
            let _ = join.await;
        }
        self.lifetime.cancel();
    }

    /// Whether the placeholder should currently be shown.
    pub fn visible(&self) -> bool {
        self.snapshots
            .borrow()
            .as_ref()
            .is_none_or(SlotSnapshot::visible)
    }

    /// Current instance state (`None` before the first `start`).
    pub fn snapshot(&self) -> Option<SlotSnapshot> {
        self.snapshots.borrow().clone()
    }

    /// Receiver notified on every state change of every instance.
    pub fn watch(&self) -> watch::Receiver<Option<SlotSnapshot>> {
        self.snapshots.subscribe()
    }

    /// Receiver of lifecycle events.
    pub fn events(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// True while the current instance's task has not finished.
    pub fn is_running(&self) -> bool {
        self.lock()
            .current
            .as_ref()
            .is_some_and(|inst| !inst.join.is_finished())
    }

    /// Route the controller currently places its slot on.
    pub fn route(&self) -> Arc<str> {
        self.lock().route.clone()
    }

    /// Placeholder markup for the host, with the current visibility.
    ///
    /// `None` before the first `start`.
    pub fn anchor(&self, class_name: Option<&str>) -> Option<Anchor> {
        let snap = self.snapshot()?;
        Some(Anchor {
            class_name: class_name.map(str::to_string),
            slot_id: snap.slot_id().to_string(),
            client_id: self.cfg.client_id.clone(),
            min_height_px: self.cfg.min_placeholder_height_px,
            visible: snap.visible(),
        })
    }

    /// Configuration this controller was built with.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Spawns a fresh instance; the previous one must already be cancelled.
    ///
    /// The new task first awaits the previous task, so the old instance's timers
    /// are gone before the new one registers.
    fn spawn_instance(&self, placement: &mut Placement, slot_id: &str) {
        let previous = placement.current.take().map(|inst| inst.join);

        let cell = InstanceCell::new(
            SlotSnapshot::new(slot_id, placement.route.clone()),
            self.snapshots.clone(),
            self.bus.clone(),
        );
        cell.emit(Event::new(EventKind::SlotStarted).with_route(placement.route.clone()));

        let actor = SlotActor {
            cell: Arc::clone(&cell),
            queue: Arc::clone(&self.queue),
            placeholder: Arc::clone(&self.placeholder),
            params: SlotActorParams::from(&self.cfg),
        };
        let join = tokio::spawn(async move {
            if let Some(prev) = previous {
                let _ = prev.await;
            }
            actor.run().await
        });

        placement.current = Some(Instance { cell, join });
    }

    fn lock(&self) -> MutexGuard<'_, Placement> {
        self.placement.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for AdSlotController {
    fn drop(&mut self) {
        self.lifetime.cancel();
        let placement = self
            .placement
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(inst) = placement.current.as_ref() {
            inst.cell.cancel();
        }
    }
}
