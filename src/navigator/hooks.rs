//! Navigation callbacks and per-call options.

use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::Value;

use crate::navigator::error::NavigationError;
use crate::navigator::orchestrator::Navigator;

/// Called with the navigator and a path.
pub type RouteHook = Arc<dyn Fn(&Navigator, &str) + Send + Sync>;

pub type ErrorHook = Arc<dyn Fn(&Navigator, &NavigationError) + Send + Sync>;

/// May redirect a navigation by resolving to another path.
pub type RequestHook = Arc<dyn Fn(&Navigator, &str) -> BoxFuture<'static, Option<String>> + Send + Sync>;

/// Router-level callbacks. All are optional.
#[derive(Clone, Default)]
pub struct Hooks {
    /// Fires at the start of every `trigger_route`.
    pub on_route_change: Option<RouteHook>,
    /// Fires after a page loaded successfully.
    pub on_page_load: Option<RouteHook>,
    pub on_route_error: Option<ErrorHook>,
    pub on_route_request: Option<RequestHook>,
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("on_route_change", &self.on_route_change.is_some())
            .field("on_page_load", &self.on_page_load.is_some())
            .field("on_route_error", &self.on_route_error.is_some())
            .field("on_route_request", &self.on_route_request.is_some())
            .finish()
    }
}

/// Options for one `trigger_route` call.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigateOptions {
    /// Replace the current history entry instead of pushing.
    pub replace: bool,
    /// Write the path to history. False for popstate navigations.
    pub trigger_url_change: bool,
    /// Overrides the route's data template; also the load signature.
    pub data: Option<Value>,
}

impl Default for NavigateOptions {
    fn default() -> Self {
        Self {
            replace: false,
            trigger_url_change: true,
            data: None,
        }
    }
}

impl NavigateOptions {
    pub fn replace() -> Self {
        Self {
            replace: true,
            ..Self::default()
        }
    }

    /// Navigate without touching history.
    pub fn silent() -> Self {
        Self {
            trigger_url_change: false,
            ..Self::default()
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegisterOptions {
    pub replace: bool,
}

/// Result of `load_page`. Failures have already been reported to hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    /// Loaded, but a newer navigation owns the view.
    Superseded,
    Failed,
    NotFound,
}
