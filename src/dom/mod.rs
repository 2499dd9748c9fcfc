//! Headless element tree.
//!
//! # Data Flow
//! ```text
//! Page/Module instance owns an Element
//!     → navigator attaches it to the shared container
//!     → module elements appended into the page element
//!     → click listeners bound on the visible set
//!
//! Element::click()
//!     → ClickEvent built from target up to root
//!     → capture-phase listeners run root → target
//!     → caller inspects default_prevented()
//! ```
//!
//! # Design Decisions
//! - Elements are reference-counted handles; equality is identity
//! - append_child moves a node that already has a parent (DOM semantics)
//! - Only capture-phase click listeners exist; nothing else is needed to
//!   intercept anchors
//! - No lock is held while a listener runs

pub mod element;
pub mod event;

pub use element::Element;
pub use event::{ClickEvent, ClickListener, ListenerId};
