//! In-process browser: history log, location, title and popstate.

use std::sync::Arc;

use parking_lot::Mutex;
use url::Url;

use crate::dom::ListenerId;
use crate::history::adapter::{
    Document, HistoryAdapter, HistoryState, Location, PopStateEvent, PopStateListener,
};

const DEFAULT_ORIGIN: &str = "http://localhost/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryKind {
    Push,
    Replace,
}

/// One recorded `push_state` / `replace_state` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub kind: HistoryKind,
    pub state: HistoryState,
    pub title: String,
    pub url: String,
}

struct BrowserState {
    current: Url,
    entries: Vec<HistoryEntry>,
    title: String,
    listeners: Vec<(ListenerId, PopStateListener)>,
}

/// History and document backed by memory.
///
/// Cloning shares the same browser.
#[derive(Clone)]
pub struct MemoryBrowser {
    state: Arc<Mutex<BrowserState>>,
}

impl MemoryBrowser {
    pub fn new() -> Self {
        let current = match Url::parse(DEFAULT_ORIGIN) {
            Ok(url) => url,
            Err(_) => unreachable!("default origin is a valid URL"),
        };
        Self::from_url(current)
    }

    /// Start at `href`. Falls back to the default origin if it does not parse.
    pub fn with_url(href: &str) -> Self {
        match Url::parse(href) {
            Ok(url) => Self::from_url(url),
            Err(e) => {
                tracing::warn!(href = %href, error = %e, "Invalid start URL, using default origin");
                Self::new()
            }
        }
    }

    fn from_url(current: Url) -> Self {
        Self {
            state: Arc::new(Mutex::new(BrowserState {
                current,
                entries: Vec::new(),
                title: String::new(),
                listeners: Vec::new(),
            })),
        }
    }

    pub fn with_title(self, title: impl Into<String>) -> Self {
        self.state.lock().title = title.into();
        self
    }

    /// Every history write so far, oldest first.
    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.state.lock().entries.clone()
    }

    /// Number of registered popstate listeners.
    pub fn listener_count(&self) -> usize {
        self.state.lock().listeners.len()
    }

    /// Emit a popstate event to every listener.
    pub fn pop_state(&self, state: Option<HistoryState>) {
        let listeners: Vec<PopStateListener> = {
            let guard = self.state.lock();
            guard.listeners.iter().map(|(_, l)| l.clone()).collect()
        };
        let event = PopStateEvent { state };
        for listener in listeners {
            listener(&event);
        }
    }

    /// Step back one entry and emit popstate with that entry's state.
    ///
    /// Returns false when there is nothing to go back to.
    pub fn back(&self) -> bool {
        let previous = {
            let mut guard = self.state.lock();
            if guard.entries.len() < 2 {
                return false;
            }
            guard.entries.pop();
            let previous = guard.entries.last().cloned();
            if let Some(entry) = &previous {
                if let Ok(url) = guard.current.join(&entry.url) {
                    guard.current = url;
                }
            }
            previous
        };
        self.pop_state(previous.map(|entry| entry.state));
        true
    }

    fn record(&self, kind: HistoryKind, state: HistoryState, title: &str, url: &str) {
        let mut guard = self.state.lock();
        match guard.current.join(url) {
            Ok(next) => guard.current = next,
            Err(e) => tracing::warn!(url = %url, error = %e, "History URL did not resolve"),
        }
        let entry = HistoryEntry {
            kind,
            state,
            title: title.to_string(),
            url: url.to_string(),
        };
        if kind == HistoryKind::Replace && !guard.entries.is_empty() {
            let last = guard.entries.len() - 1;
            guard.entries[last] = entry;
        } else {
            guard.entries.push(entry);
        }
    }
}

impl Default for MemoryBrowser {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryAdapter for MemoryBrowser {
    fn push_state(&self, state: HistoryState, title: &str, url: &str) {
        self.record(HistoryKind::Push, state, title, url);
    }

    fn replace_state(&self, state: HistoryState, title: &str, url: &str) {
        self.record(HistoryKind::Replace, state, title, url);
    }

    fn location(&self) -> Location {
        let guard = self.state.lock();
        let url = &guard.current;
        Location {
            pathname: url.path().to_string(),
            hash: url.fragment().map(|f| format!("#{f}")).unwrap_or_default(),
            hostname: url.host_str().unwrap_or_default().to_string(),
            href: url.as_str().to_string(),
        }
    }

    fn add_popstate_listener(&self, listener: PopStateListener) -> ListenerId {
        let id = ListenerId::next();
        self.state.lock().listeners.push((id, listener));
        id
    }

    fn remove_popstate_listener(&self, id: ListenerId) -> bool {
        let mut guard = self.state.lock();
        let before = guard.listeners.len();
        guard.listeners.retain(|(existing, _)| *existing != id);
        guard.listeners.len() != before
    }
}

impl Document for MemoryBrowser {
    fn title(&self) -> String {
        self.state.lock().title.clone()
    }

    fn set_title(&self, title: &str) {
        self.state.lock().title = title.to_string();
    }
}
