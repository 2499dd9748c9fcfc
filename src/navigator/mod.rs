//! Navigation orchestration.
//!
//! # Data Flow
//! ```text
//! trigger_route(path)
//!     → on_route_change hook
//!     → RouteTable::resolve (unknown → register_url, on_route_error, done)
//!     → on_route_request hook (optional redirect)
//!     → register_url(original path)
//!     → load_page(target)
//!         → PageCache (reuse when the data signature matches)
//!         → page load() ∥ module load() + fetch_data()
//!         → view lock: hide previous, attach, compose, show, title, links
//!     → register_url(target) when redirected to a known route
//!
//! popstate / anchor click
//!     → worker.rs intent queue
//!     → trigger_route on a spawned task
//! ```
//!
//! # Design Decisions
//! - One orchestrator owns its caches; nothing is stored in statics
//! - Hooks receive the navigator as explicit call context
//! - Overlapping navigations: the latest one owns the view

pub mod builder;
pub mod error;
pub mod hooks;
pub mod orchestrator;
pub mod worker;

pub use builder::NavigatorBuilder;
pub use error::NavigationError;
pub use hooks::{Hooks, LoadOutcome, NavigateOptions, RegisterOptions};
pub use orchestrator::Navigator;
pub use worker::Intent;
