//! # Slot lifecycle configuration.
//!
//! Provides [`Config`] centralized timing and rendering settings for an
//! [`AdSlotController`](crate::AdSlotController).
//!
//! Config is used in two ways:
//! 1. **Controller creation**: `AdSlotController::builder(config)`
//! 2. **Anchor rendering**: client id and minimum placeholder height
//!
//! ## Sentinel values
//! - `max_poll_checks = 0` → no check-count cap (the absolute timeout bounds polling)
//! - `absolute_timeout = 0s` → no absolute deadline (the check-count cap bounds polling)
//!
//! At least one of the two must be set; see [`Config::validate`].

use std::time::Duration;

use crate::error::ConfigError;

/// Publisher id of the ad library account the placeholders belong to.
pub const DEFAULT_CLIENT_ID: &str = "ca-pub-1581472267398547";

/// Configuration for one ad slot controller.
///
/// Defines:
/// - **Registration**: delay between attempts and the retry cap
/// - **Fill detection**: poll interval, check cap, absolute deadline
/// - **Rendering**: library client id and minimum placeholder height
/// - **Event system**: bus capacity for event delivery
///
/// ## Notes
/// All fields are public for flexibility. Prefer the helper accessors to avoid
/// sprinkling sentinel checks (`0`) across the codebase.
#[derive(Clone, Debug)]
pub struct Config {
    /// Fixed delay between registration attempts while the library queue is not ready.
    pub retry_delay: Duration,

    /// Maximum number of registration retries after the initial attempt.
    ///
    /// With `n` retries the instance gives up at `n × retry_delay`.
    pub max_registration_retries: u32,

    /// Interval between fill checks once the slot is registered.
    pub poll_interval: Duration,

    /// Maximum number of fill checks (`0` = no count cap).
    pub max_poll_checks: u32,

    /// Absolute fill deadline measured from registration (`0s` = no deadline).
    pub absolute_timeout: Duration,

    /// Minimum height reserved for the placeholder, in CSS pixels.
    pub min_placeholder_height_px: u32,

    /// Ad library client identifier rendered onto the placeholder.
    pub client_id: String,

    /// Capacity of the event bus broadcast channel ring buffer (min 1).
    pub bus_capacity: usize,
}

impl Config {
    /// Returns the check-count cap as an `Option`.
    ///
    /// - `None` → polling is bounded by the absolute timeout only
    /// - `Some(n)` → at most `n` fill checks
    #[inline]
    pub fn poll_budget(&self) -> Option<u32> {
        if self.max_poll_checks == 0 {
            None
        } else {
            Some(self.max_poll_checks)
        }
    }

    /// Returns the absolute fill deadline as an `Option`.
    #[inline]
    pub fn fill_deadline(&self) -> Option<Duration> {
        if self.absolute_timeout == Duration::ZERO {
            None
        } else {
            Some(self.absolute_timeout)
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Checks that every loop driven by this config is bounded and makes progress.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retry_delay == Duration::ZERO {
            return Err(ConfigError::ZeroRetryDelay);
        }
        if self.poll_interval == Duration::ZERO {
            return Err(ConfigError::ZeroPollInterval);
        }
        if self.poll_budget().is_none() && self.fill_deadline().is_none() {
            return Err(ConfigError::UnboundedPolling);
        }
        Ok(())
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `retry_delay = 300ms`, `max_registration_retries = 10`
    /// - `poll_interval = 500ms`, `max_poll_checks = 20`
    /// - `absolute_timeout = 10s`
    /// - `min_placeholder_height_px = 250`
    /// - `bus_capacity = 256`
    fn default() -> Self {
        Self {
            retry_delay: Duration::from_millis(300),
            max_registration_retries: 10,
            poll_interval: Duration::from_millis(500),
            max_poll_checks: 20,
            absolute_timeout: Duration::from_millis(10_000),
            min_placeholder_height_px: 250,
            client_id: DEFAULT_CLIENT_ID.to_string(),
            bus_capacity: 256,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let cfg = Config::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.poll_budget(), Some(20));
        assert_eq!(cfg.fill_deadline(), Some(Duration::from_secs(10)));
    }

    #[test]
    fn test_single_cap_is_enough() {
        let cfg = Config {
            max_poll_checks: 0,
            ..Config::default()
        };
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.poll_budget(), None);

        let cfg = Config {
            absolute_timeout: Duration::ZERO,
            ..Config::default()
        };
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.fill_deadline(), None);
    }

    #[test]
    fn test_rejects_unbounded_polling() {
        let cfg = Config {
            max_poll_checks: 0,
            absolute_timeout: Duration::ZERO,
            ..Config::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::UnboundedPolling)));
    }

    #[test]
    fn test_rejects_zero_intervals() {
        let cfg = Config {
            retry_delay: Duration::ZERO,
            ..Config::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::ZeroRetryDelay)));

        let cfg = Config {
            poll_interval: Duration::ZERO,
            ..Config::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::ZeroPollInterval)));
    }

    #[test]
    fn test_bus_capacity_clamped() {
        let cfg = Config {
            bus_capacity: 0,
            ..Config::default()
        };
        assert_eq!(cfg.bus_capacity_clamped(), 1);
    }
}
