//! Instance caches.
//!
//! # Data Flow
//! ```text
//! Navigator::load_page
//!     → pages.rs   (route key → PageEntry: instance, signature, modules)
//!     → modules.rs (module name → global singleton + active flag)
//! ```
//!
//! # Design Decisions
//! - Both caches are `Arc<DashMap>` wrappers; handles clone cheaply
//! - Entries are cloned out of the map, never borrowed across an await
//! - Loads are memoized in a `OnceCell`, so concurrent navigations to the
//!   same entry share one `load()` call

pub mod modules;
pub mod pages;

pub use modules::{GlobalModuleEntry, GlobalModuleRegistry, ModuleSlot};
pub use pages::{PageCache, PageEntry, PageModule};
