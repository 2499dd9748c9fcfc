//! Reference-counted element handle.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::dom::event::{ClickEvent, ClickListener, ListenerId};

struct Node {
    tag: String,
    state: Mutex<NodeState>,
}

#[derive(Default)]
struct NodeState {
    attributes: BTreeMap<String, String>,
    classes: Vec<String>,
    children: Vec<Element>,
    parent: Weak<Node>,
    listeners: Vec<(ListenerId, ClickListener)>,
}

/// A node in the headless element tree.
///
/// Cloning yields another handle to the same node.
#[derive(Clone)]
pub struct Element {
    node: Arc<Node>,
}

impl Element {
    /// Create a detached element with the given tag name.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            node: Arc::new(Node {
                tag: tag.into().to_lowercase(),
                state: Mutex::new(NodeState::default()),
            }),
        }
    }

    pub fn div() -> Self {
        Self::new("div")
    }

    /// Create an `<a>` element pointing at `href`.
    pub fn anchor(href: impl Into<String>) -> Self {
        let el = Self::new("a");
        el.set_attribute("href", href);
        el
    }

    pub fn tag(&self) -> &str {
        &self.node.tag
    }

    pub fn is_anchor(&self) -> bool {
        self.node.tag == "a"
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.node.state.lock().attributes.get(name).cloned()
    }

    pub fn set_attribute(&self, name: impl Into<String>, value: impl Into<String>) {
        self.node
            .state
            .lock()
            .attributes
            .insert(name.into(), value.into());
    }

    /// Add a CSS class; duplicates are ignored.
    pub fn add_class(&self, class: &str) {
        if class.is_empty() {
            return;
        }
        let mut state = self.node.state.lock();
        if !state.classes.iter().any(|c| c == class) {
            state.classes.push(class.to_string());
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.node.state.lock().classes.iter().any(|c| c == class)
    }

    pub fn classes(&self) -> Vec<String> {
        self.node.state.lock().classes.clone()
    }

    pub fn children(&self) -> Vec<Element> {
        self.node.state.lock().children.clone()
    }

    pub fn parent(&self) -> Option<Element> {
        self.node
            .state
            .lock()
            .parent
            .upgrade()
            .map(|node| Element { node })
    }

    /// Append `child` as the last child, moving it out of its current
    /// parent first.
    pub fn append_child(&self, child: &Element) {
        if child == self || child.contains(self) {
            tracing::warn!(tag = %child.tag(), "refusing to append an element into itself");
            return;
        }
        child.detach();
        self.node.state.lock().children.push(child.clone());
        child.node.state.lock().parent = Arc::downgrade(&self.node);
    }

    /// Remove `child` if it is a direct child. Returns whether it was.
    pub fn remove_child(&self, child: &Element) -> bool {
        let removed = {
            let mut state = self.node.state.lock();
            let before = state.children.len();
            state.children.retain(|c| c != child);
            state.children.len() != before
        };
        if removed {
            child.node.state.lock().parent = Weak::new();
        }
        removed
    }

    /// Remove this element from its parent, if any.
    pub fn detach(&self) {
        if let Some(parent) = self.parent() {
            parent.remove_child(self);
        }
    }

    /// True when `other` is this element or one of its descendants.
    pub fn contains(&self, other: &Element) -> bool {
        let mut cursor = Some(other.clone());
        while let Some(element) = cursor {
            if &element == self {
                return true;
            }
            cursor = element.parent();
        }
        false
    }

    pub fn add_click_listener(&self, listener: ClickListener) -> ListenerId {
        let id = ListenerId::next();
        self.node.state.lock().listeners.push((id, listener));
        id
    }

    pub fn remove_click_listener(&self, id: ListenerId) -> bool {
        let mut state = self.node.state.lock();
        let before = state.listeners.len();
        state.listeners.retain(|(existing, _)| *existing != id);
        state.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.node.state.lock().listeners.len()
    }

    /// Dispatch a click on this element through the capture phase.
    pub fn click(&self) -> ClickEvent {
        let mut path = vec![self.clone()];
        let mut cursor = self.parent();
        while let Some(element) = cursor {
            cursor = element.parent();
            path.push(element);
        }

        let mut event = ClickEvent::new(self.clone());
        for host in path.into_iter().rev() {
            let listeners: Vec<ClickListener> = host
                .node
                .state
                .lock()
                .listeners
                .iter()
                .map(|(_, l)| l.clone())
                .collect();
            event.set_current_target(host);
            for listener in listeners {
                listener(&mut event);
            }
        }
        event
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.node, &other.node)
    }
}

impl Eq for Element {}

impl Default for Element {
    fn default() -> Self {
        Self::div()
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.node.state.lock();
        f.debug_struct("Element")
            .field("tag", &self.node.tag)
            .field("classes", &state.classes)
            .field("children", &state.children.len())
            .finish()
    }
}
