//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Navigation path ("/profile/32?tab=posts")
//!     → matcher.rs (normalize: strip one leading '/', drop query)
//!     → router.rs (ordered pattern scan)
//!     → Return: RouteMatch (definition, capture groups, key) or None
//!
//! Route Compilation (at build time):
//!     RouteDefinition[]
//!     → Compile each pattern once
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled once, immutable at runtime
//! - Patterns are NOT anchored implicitly
//! - Deterministic: same input always matches same route
//! - First match wins (declaration order, never specificity)

pub mod matcher;
pub mod router;

pub use router::{RouteMatch, RouteTable};
