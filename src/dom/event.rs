//! Click events and listener identifiers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::dom::element::Element;

/// Identifies a registered listener so it can be removed later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Allocate a process-unique listener id.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// A capture-phase click listener.
pub type ClickListener = Arc<dyn Fn(&mut ClickEvent) + Send + Sync>;

/// A click travelling from the document root down to its target.
#[derive(Debug)]
pub struct ClickEvent {
    target: Element,
    current_target: Option<Element>,
    default_prevented: bool,
}

impl ClickEvent {
    pub(crate) fn new(target: Element) -> Self {
        Self {
            target,
            current_target: None,
            default_prevented: false,
        }
    }

    pub(crate) fn set_current_target(&mut self, element: Element) {
        self.current_target = Some(element);
    }

    /// The element that was clicked.
    pub fn target(&self) -> &Element {
        &self.target
    }

    /// The element whose listener is currently running.
    pub fn current_target(&self) -> Option<&Element> {
        self.current_target.as_ref()
    }

    /// Cancel the default action (following the link).
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    /// The nearest `<a>` at or above the target, without leaving the
    /// element whose listener is running.
    pub fn closest_anchor(&self) -> Option<Element> {
        let boundary = self.current_target.as_ref();
        let mut cursor = Some(self.target.clone());
        while let Some(element) = cursor {
            if element.is_anchor() {
                return Some(element);
            }
            if boundary == Some(&element) {
                return None;
            }
            cursor = element.parent();
        }
        None
    }
}
