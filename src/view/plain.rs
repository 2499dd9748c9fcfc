//! Instance used for definitions that name no script.

use crate::dom::Element;
use crate::view::capability::View;

/// A view with an element and nothing else.
#[derive(Debug, Clone)]
pub struct PlainView {
    el: Element,
}

impl PlainView {
    pub fn new(el: Element) -> Self {
        Self { el }
    }
}

impl View for PlainView {
    fn el(&self) -> Element {
        self.el.clone()
    }
}
