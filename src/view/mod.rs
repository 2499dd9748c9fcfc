//! Page and module capability contract.
//!
//! # Data Flow
//! ```text
//! RouteDefinition / ModuleDefinition
//!     → options.rs (merged construction options)
//!     → resolver.rs (script id → factory or ready instance)
//!     → capability.rs (View: load, fetch_data, show, hide, error, destroy)
//! ```
//!
//! # Design Decisions
//! - Every capability has a default body: an instance that implements
//!   nothing but `el()` is valid and behaves as a no-op
//! - Definitions without a script get a PlainView; the resolver is not
//!   consulted
//! - Resolution is synchronous; only the lifecycle methods are async

pub mod capability;
pub mod options;
pub mod plain;
pub mod resolver;

pub use capability::{View, ViewError};
pub use options::{PageClasses, ViewOptions};
pub use plain::PlainView;
pub use resolver::{Resolved, ScriptRegistry, ScriptResolver, ViewFactory};
