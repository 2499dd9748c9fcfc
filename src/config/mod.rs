//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → NavigatorConfig (validated, immutable)
//!     → Navigator::builder compiles the route table
//! ```
//!
//! # Design Decisions
//! - Config is immutable once a navigator is built
//! - All fields have defaults to allow minimal configs
//! - Pages are an ordered array: declaration order is the match order
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{DisplayConfig, ModuleDefinition, NavigatorConfig, ObservabilityConfig, RouteDefinition};
pub use validation::{validate_config, ValidationError};
