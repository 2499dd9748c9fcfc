//! Browser history and document collaborators.
//!
//! # Data Flow
//! ```text
//! Navigator::register_url → HistoryAdapter::push_state / replace_state
//! HistoryAdapter popstate  → listener → navigation intent
//! Navigator title update   → Document::set_title
//! ```
//!
//! # Design Decisions
//! - The navigator only sees the traits; `MemoryBrowser` is the in-process
//!   implementation used by default and in tests
//! - Query strings are parsed with the `url` crate, relative URLs resolved
//!   against the current location

pub mod adapter;
pub mod memory;
pub mod query;

pub use adapter::{Document, HistoryAdapter, HistoryState, Location, PopStateEvent, PopStateListener};
pub use memory::{HistoryEntry, HistoryKind, MemoryBrowser};
pub use query::parse_query;
