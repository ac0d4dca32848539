//! # Ad library request queue.
//!
//! The third-party library exposes one process-wide queue; pushing a request asks
//! it to fill the most recently inserted matching placeholder. The queue may not
//! exist yet (script still loading, or blocked), and a push may raise.
//!
//! Controllers receive the queue as a capability ([`AdQueue`]) and only ever
//! append to it; they never read or remove entries.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::PushError;

/// Request handed to the library for one slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FillRequest {
    /// Slot the request was made for.
    pub slot_id: Arc<str>,
}

/// Push-only sink into the ad library's shared queue.
///
/// Both methods run while the instance's state lock is held, so that no push can
/// follow `cancel()`. Implementations must not call back into the controller's
/// mutating operations (`start`, `cancel`, `reset`, `navigate`) from inside them:
/// that would re-enter the lock and deadlock. Read-only accessors such as
/// `snapshot()` and `visible()` are safe.
pub trait AdQueue: Send + Sync + 'static {
    /// `true` once the queue exists and is a usable list.
    fn is_ready(&self) -> bool;

    /// Appends a fill request. May fail (or panic) inside the library.
    fn push(&self, request: &FillRequest) -> Result<(), PushError>;
}

/// In-memory stand-in for the library's queue.
///
/// Starts absent; [`SharedQueue::install`] models the script finishing its load.
/// The library side takes pending requests with [`SharedQueue::drain`].
#[derive(Debug, Default)]
pub struct SharedQueue {
    installed: AtomicBool,
    pending: Mutex<Vec<FillRequest>>,
}

impl SharedQueue {
    /// Queue that is not installed yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue that is already installed.
    pub fn installed() -> Self {
        let q = Self::new();
        q.install();
        q
    }

    /// Marks the queue present.
    pub fn install(&self) {
        self.installed.store(true, Ordering::SeqCst);
    }

    /// Takes all requests pushed since the last drain.
    pub fn drain(&self) -> Vec<FillRequest> {
        std::mem::take(
            &mut *self
                .pending
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner),
        )
    }
}

impl AdQueue for SharedQueue {
    fn is_ready(&self) -> bool {
        self.installed.load(Ordering::SeqCst)
    }

    fn push(&self, request: &FillRequest) -> Result<(), PushError> {
        if !self.is_ready() {
            return Err(PushError::new("queue not installed"));
        }
        self.pending
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(request.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_requires_install() {
        let q = SharedQueue::new();
        let req = FillRequest {
            slot_id: Arc::from("s1"),
        };
        assert!(!q.is_ready());
        assert!(q.push(&req).is_err());

        q.install();
        assert!(q.push(&req).is_ok());
        assert_eq!(q.drain(), vec![req]);
        assert!(q.drain().is_empty());
    }
}
