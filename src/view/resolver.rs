//! Script resolution.
//!
//! # Responsibilities
//! - Map a script id to a factory or a ready instance
//! - Run factories with the element placeholder and merged options
//!
//! # Design Decisions
//! - Resolution is synchronous and side-effect free
//! - An unknown script id is reported, never guessed

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;

use crate::dom::Element;
use crate::view::capability::{View, ViewError};
use crate::view::options::ViewOptions;

/// Builds an instance from `(element, options)`.
pub type ViewFactory =
    Arc<dyn Fn(Element, ViewOptions) -> Result<Arc<dyn View>, ViewError> + Send + Sync>;

/// What a script id resolves to.
#[derive(Clone)]
pub enum Resolved {
    Factory(ViewFactory),
    Instance(Arc<dyn View>),
}

impl Resolved {
    /// Produce the instance: call the factory, or hand back the instance.
    pub fn instantiate(&self, el: Element, options: ViewOptions) -> Result<Arc<dyn View>, ViewError> {
        match self {
            Resolved::Factory(factory) => factory(el, options),
            Resolved::Instance(instance) => Ok(instance.clone()),
        }
    }
}

impl fmt::Debug for Resolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolved::Factory(_) => f.write_str("Resolved::Factory"),
            Resolved::Instance(_) => f.write_str("Resolved::Instance"),
        }
    }
}

/// Resolves script ids to page/module constructors.
pub trait ScriptResolver: Send + Sync {
    fn resolve(&self, script_id: &str) -> Option<Resolved>;
}

/// In-memory resolver keyed by script id.
#[derive(Clone, Default)]
pub struct ScriptRegistry {
    scripts: Arc<DashMap<String, Resolved>>,
}

impl ScriptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory; replaces any previous registration for the id.
    pub fn register_factory<F>(&self, script_id: impl Into<String>, factory: F)
    where
        F: Fn(Element, ViewOptions) -> Result<Arc<dyn View>, ViewError> + Send + Sync + 'static,
    {
        self.scripts
            .insert(script_id.into(), Resolved::Factory(Arc::new(factory)));
    }

    /// Register a ready instance returned as-is on every resolution.
    pub fn register_instance(&self, script_id: impl Into<String>, instance: Arc<dyn View>) {
        self.scripts
            .insert(script_id.into(), Resolved::Instance(instance));
    }

    pub fn unregister(&self, script_id: &str) -> bool {
        self.scripts.remove(script_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }
}

impl ScriptResolver for ScriptRegistry {
    fn resolve(&self, script_id: &str) -> Option<Resolved> {
        self.scripts.get(script_id).map(|r| r.value().clone())
    }
}
