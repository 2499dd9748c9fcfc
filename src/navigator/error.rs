//! Navigation errors.

use thiserror::Error;

use crate::view::ViewError;

/// Failures surfaced through `on_route_error` or returned by lifecycle calls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    #[error("no route matches '{0}'")]
    RouteNotFound(String),

    #[error("page '{path}' failed to load: {source}")]
    PageLoad {
        path: String,
        #[source]
        source: ViewError,
    },

    #[error("page '{0}' is not loaded")]
    PageNotLoaded(String),

    #[error("navigator is already started")]
    AlreadyStarted,

    #[error("navigator has been stopped")]
    Stopped,

    #[error("navigator must be started inside a tokio runtime")]
    NoRuntime,
}
