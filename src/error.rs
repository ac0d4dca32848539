//! Error types used by the slot lifecycle.
//!
//! This module defines three types:
//!
//! - [`RegisterError`]: why one registration attempt did not reach the ad library.
//! - [`PushError`]: what an [`AdQueue`](crate::AdQueue) implementation reports when a push fails.
//! - [`ConfigError`]: configuration rejected by [`Config::validate`](crate::Config::validate).
//!
//! None of these ever reach the host page: registration errors are folded into the
//! retry loop and only surface as events. Labels from `as_label` are stable and
//! meant for logs/metrics.

use thiserror::Error;

/// # Errors produced by one registration attempt.
///
/// Both variants are recovered the same way: wait `retry_delay` and try again,
/// until `max_registration_retries` is exhausted.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegisterError {
    /// The library's shared queue is absent or not a usable collection.
    #[error("ad library queue not ready")]
    LibraryNotReady,

    /// The push into the queue raised (returned an error or panicked).
    #[error("registration threw: {reason}")]
    RegistrationThrew {
        /// The underlying error message.
        reason: String,
    },
}

impl RegisterError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use siderail::RegisterError;
    ///
    /// let err = RegisterError::LibraryNotReady;
    /// assert_eq!(err.as_label(), "library_not_ready");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RegisterError::LibraryNotReady => "library_not_ready",
            RegisterError::RegistrationThrew { .. } => "registration_threw",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RegisterError::LibraryNotReady => "queue absent or not list-like".to_string(),
            RegisterError::RegistrationThrew { reason } => format!("push failed: {reason}"),
        }
    }
}

impl From<PushError> for RegisterError {
    fn from(err: PushError) -> Self {
        RegisterError::RegistrationThrew {
            reason: err.to_string(),
        }
    }
}

/// Failure reported by an [`AdQueue`](crate::AdQueue) push.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct PushError(pub String);

impl PushError {
    /// Creates a push error from any message.
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// # Configuration rejected at build time.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// `retry_delay` is zero; retries would spin.
    #[error("retry delay must be greater than zero")]
    ZeroRetryDelay,

    /// `poll_interval` is zero; polling would spin.
    #[error("poll interval must be greater than zero")]
    ZeroPollInterval,

    /// Neither `max_poll_checks` nor `absolute_timeout` bounds fill detection.
    #[error("fill detection needs a check cap or an absolute timeout")]
    UnboundedPolling,
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::ZeroRetryDelay => "config_zero_retry_delay",
            ConfigError::ZeroPollInterval => "config_zero_poll_interval",
            ConfigError::UnboundedPolling => "config_unbounded_polling",
        }
    }
}

/// Extracts a readable message from a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_error_folds_into_threw() {
        let err: RegisterError = PushError::new("adsbygoogle.push() error: No slot size").into();
        assert_eq!(err.as_label(), "registration_threw");
        assert_eq!(
            err.to_string(),
            "registration threw: adsbygoogle.push() error: No slot size"
        );
    }

    #[test]
    fn test_labels_are_stable() {
        assert_eq!(RegisterError::LibraryNotReady.as_label(), "library_not_ready");
        assert_eq!(
            ConfigError::UnboundedPolling.as_label(),
            "config_unbounded_polling"
        );
    }
}
