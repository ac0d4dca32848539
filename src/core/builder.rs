use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;

use crate::{
    config::Config,
    error::ConfigError,
    events::Bus,
    slot::{AdQueue, Placeholder},
    subscribers::{Subscribe, SubscriberSet},
};

use super::controller::AdSlotController;

/// Builder for constructing an [`AdSlotController`] with optional subscribers.
pub struct ControllerBuilder {
    cfg: Config,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl ControllerBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
        }
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive lifecycle events through dedicated workers with
    /// bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Adds one subscriber.
    pub fn with_subscriber(mut self, subscriber: Arc<dyn Subscribe>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    /// Validates the config and builds the controller.
    ///
    /// `queue` is the ad library's shared queue; `placeholder` is the element
    /// this controller owns exclusively. Must be called inside a Tokio runtime
    /// when subscribers are configured.
    pub fn build(
        self,
        queue: Arc<dyn AdQueue>,
        placeholder: Arc<dyn Placeholder>,
    ) -> Result<Arc<AdSlotController>, ConfigError> {
        self.cfg.validate()?;

        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let lifetime = CancellationToken::new();

        if !self.subscribers.is_empty() {
            let subs = SubscriberSet::new(self.subscribers, bus.clone());
            spawn_subscriber_listener(&bus, subs, lifetime.clone());
        }

        Ok(AdSlotController::new_internal(
            self.cfg,
            bus,
            queue,
            placeholder,
            lifetime,
        ))
    }
}

/// Forwards bus events to the subscriber set until the controller's lifetime ends,
/// then drains subscriber queues.
fn spawn_subscriber_listener(bus: &Bus, subs: SubscriberSet, lifetime: CancellationToken) {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                msg = rx.recv() => match msg {
                    Ok(ev) => subs.emit(&ev),
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break,
                },
                _ = lifetime.cancelled() => break,
            }
        }
        subs.shutdown().await;
    });
}
