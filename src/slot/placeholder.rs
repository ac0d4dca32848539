//! # Placeholder probe and fill evidence.
//!
//! The ad library never notifies anyone that it filled a slot. What it does leave
//! behind is DOM-visible: the placeholder gains a rendered height, or one of two
//! marker attributes. [`detect`] ORs these together; the first one present wins.
//!
//! ```text
//! rendered_height() > 0                      ─► FillSignal::Height(h)
//! data-adsbygoogle-status = "done"           ─► FillSignal::StatusDone
//! data-ad-status          = "filled"         ─► FillSignal::Filled
//! ```

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

/// Attribute the library sets once it processed the element.
pub const STATUS_ATTR: &str = "data-adsbygoogle-status";
/// Value of [`STATUS_ATTR`] meaning processing completed.
pub const STATUS_DONE: &str = "done";
/// Attribute the library sets to report whether content was served.
pub const FILL_ATTR: &str = "data-ad-status";
/// Value of [`FILL_ATTR`] meaning content was served.
pub const FILL_FILLED: &str = "filled";

/// Read-only view of the placeholder element.
///
/// One controller owns its placeholder exclusively for the instance's lifetime.
pub trait Placeholder: Send + Sync + 'static {
    /// Rendered height in CSS pixels (`0` when empty or detached).
    fn rendered_height(&self) -> u32;

    /// Value of a DOM attribute, if present.
    fn attribute(&self, name: &str) -> Option<String>;
}

/// Evidence that the library rendered content into the slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FillSignal {
    /// Element has a non-zero rendered height.
    Height(u32),
    /// `data-adsbygoogle-status="done"`.
    StatusDone,
    /// `data-ad-status="filled"`.
    Filled,
}

/// Inspects the placeholder once. Returns the first positive signal.
pub fn detect(placeholder: &dyn Placeholder) -> Option<FillSignal> {
    let height = placeholder.rendered_height();
    if height > 0 {
        return Some(FillSignal::Height(height));
    }
    if placeholder.attribute(STATUS_ATTR).as_deref() == Some(STATUS_DONE) {
        return Some(FillSignal::StatusDone);
    }
    if placeholder.attribute(FILL_ATTR).as_deref() == Some(FILL_FILLED) {
        return Some(FillSignal::Filled);
    }
    None
}

/// In-memory placeholder mirror.
///
/// Hosts that observe the real element elsewhere (a mutation observer, a
/// headless browser) write measurements here; the controller reads them.
#[derive(Debug, Default)]
pub struct MemoryPlaceholder {
    height: AtomicU32,
    attrs: Mutex<HashMap<String, String>>,
}

impl MemoryPlaceholder {
    /// Empty placeholder: zero height, no attributes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a new rendered height.
    pub fn set_height(&self, px: u32) {
        self.height.store(px, Ordering::SeqCst);
    }

    /// Sets or replaces an attribute.
    pub fn set_attribute(&self, name: impl Into<String>, value: impl Into<String>) {
        self.attrs
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(name.into(), value.into());
    }
}

impl Placeholder for MemoryPlaceholder {
    fn rendered_height(&self) -> u32 {
        self.height.load(Ordering::SeqCst)
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.attrs
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(name)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_placeholder_has_no_signal() {
        assert_eq!(detect(&MemoryPlaceholder::new()), None);
    }

    #[test]
    fn test_each_signal_alone_is_sufficient() {
        let p = MemoryPlaceholder::new();
        p.set_height(250);
        assert_eq!(detect(&p), Some(FillSignal::Height(250)));

        let p = MemoryPlaceholder::new();
        p.set_attribute(STATUS_ATTR, STATUS_DONE);
        assert_eq!(detect(&p), Some(FillSignal::StatusDone));

        let p = MemoryPlaceholder::new();
        p.set_attribute(FILL_ATTR, FILL_FILLED);
        assert_eq!(detect(&p), Some(FillSignal::Filled));
    }

    #[test]
    fn test_unfilled_markers_are_not_evidence() {
        let p = MemoryPlaceholder::new();
        p.set_attribute(FILL_ATTR, "unfilled");
        p.set_attribute(STATUS_ATTR, "pending");
        assert_eq!(detect(&p), None);
    }
}
