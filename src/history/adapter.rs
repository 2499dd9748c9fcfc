//! History and document traits.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::dom::ListenerId;

/// State object stored with each history entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryState {
    pub path: Option<String>,
}

impl HistoryState {
    pub fn for_path(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }
}

/// Fired when the user moves through history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PopStateEvent {
    pub state: Option<HistoryState>,
}

impl PopStateEvent {
    /// The path carried by the entry, if any.
    pub fn path(&self) -> Option<&str> {
        self.state.as_ref().and_then(|s| s.path.as_deref())
    }
}

/// Snapshot of the current location.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub pathname: String,
    /// Fragment including the leading `#`, or empty.
    pub hash: String,
    pub hostname: String,
    pub href: String,
}

pub type PopStateListener = Arc<dyn Fn(&PopStateEvent) + Send + Sync>;

/// Push/replace history entries and observe popstate.
pub trait HistoryAdapter: Send + Sync {
    fn push_state(&self, state: HistoryState, title: &str, url: &str);

    fn replace_state(&self, state: HistoryState, title: &str, url: &str);

    fn location(&self) -> Location;

    fn add_popstate_listener(&self, listener: PopStateListener) -> ListenerId;

    fn remove_popstate_listener(&self, id: ListenerId) -> bool;
}

/// Owner of the document title.
pub trait Document: Send + Sync {
    fn title(&self) -> String;

    fn set_title(&self, title: &str);
}
