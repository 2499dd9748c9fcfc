//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events (navigation steps, failures, lifecycle)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → logging.rs subscriber (stdout)
//!     → any `metrics` recorder the host installs
//! ```
//!
//! # Design Decisions
//! - Structured fields on every event (path, key, module)
//! - Metrics are cheap; without a recorder they are no-ops
//! - The library never installs a subscriber or recorder itself

pub mod logging;
pub mod metrics;
