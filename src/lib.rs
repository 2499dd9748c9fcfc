//! Client-side page navigation engine.
//!
//! Resolves paths to pages and composable modules, caches their
//! instances, drives their async load/show/hide/destroy lifecycle and
//! keeps browser history consistent with what is visible.

pub mod cache;
pub mod config;
pub mod dom;
pub mod history;
pub mod navigator;
pub mod observability;
pub mod routing;
pub mod view;

pub use config::schema::NavigatorConfig;
pub use dom::Element;
pub use navigator::{LoadOutcome, NavigateOptions, NavigationError, Navigator};
pub use view::{View, ViewError, ViewOptions};
