//! Navigator construction.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::config::loader::ConfigError;
use crate::config::schema::NavigatorConfig;
use crate::dom::Element;
use crate::history::{Document, HistoryAdapter, MemoryBrowser};
use crate::navigator::error::NavigationError;
use crate::navigator::hooks::Hooks;
use crate::navigator::orchestrator::{Collaborators, Inner, Navigator};
use crate::routing::RouteTable;
use crate::view::{ScriptRegistry, ScriptResolver};

/// Builder for [`Navigator`].
///
/// Unset collaborators default to a detached `div` container, an empty
/// [`ScriptRegistry`] and a fresh [`MemoryBrowser`].
pub struct NavigatorBuilder {
    config: NavigatorConfig,
    container: Option<Element>,
    mount_points: HashMap<String, Element>,
    resolver: Option<Arc<dyn ScriptResolver>>,
    history: Option<Arc<dyn HistoryAdapter>>,
    document: Option<Arc<dyn Document>>,
    hooks: Hooks,
}

impl NavigatorBuilder {
    pub(crate) fn new(config: NavigatorConfig) -> Self {
        Self {
            config,
            container: None,
            mount_points: HashMap::new(),
            resolver: None,
            history: None,
            document: None,
            hooks: Hooks::default(),
        }
    }

    /// Element pages are attached to.
    pub fn container(mut self, container: Element) -> Self {
        self.container = Some(container);
        self
    }

    /// Element handed to global modules declaring `el = name`.
    pub fn mount_point(mut self, name: impl Into<String>, el: Element) -> Self {
        self.mount_points.insert(name.into(), el);
        self
    }

    pub fn resolver(mut self, resolver: impl ScriptResolver + 'static) -> Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    pub fn history(mut self, history: Arc<dyn HistoryAdapter>) -> Self {
        self.history = Some(history);
        self
    }

    pub fn document(mut self, document: Arc<dyn Document>) -> Self {
        self.document = Some(document);
        self
    }

    /// Use one object as both history and document.
    pub fn browser<B>(self, browser: Arc<B>) -> Self
    where
        B: HistoryAdapter + Document + 'static,
    {
        self.history(browser.clone()).document(browser)
    }

    pub fn on_route_change<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Navigator, &str) + Send + Sync + 'static,
    {
        self.hooks.on_route_change = Some(Arc::new(hook));
        self
    }

    pub fn on_page_load<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Navigator, &str) + Send + Sync + 'static,
    {
        self.hooks.on_page_load = Some(Arc::new(hook));
        self
    }

    pub fn on_route_error<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Navigator, &NavigationError) + Send + Sync + 'static,
    {
        self.hooks.on_route_error = Some(Arc::new(hook));
        self
    }

    pub fn on_route_request<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Navigator, &str) -> BoxFuture<'static, Option<String>> + Send + Sync + 'static,
    {
        self.hooks.on_route_request = Some(Arc::new(hook));
        self
    }

    /// Compile the route table and assemble the navigator.
    pub fn build(self) -> Result<Navigator, ConfigError> {
        let routes = RouteTable::compile(&self.config.pages)?;

        let (history, document): (Arc<dyn HistoryAdapter>, Arc<dyn Document>) =
            match (self.history, self.document) {
                (Some(history), Some(document)) => (history, document),
                (history, document) => {
                    let browser = Arc::new(MemoryBrowser::new());
                    (
                        history.unwrap_or_else(|| browser.clone() as Arc<dyn HistoryAdapter>),
                        document.unwrap_or_else(|| browser as Arc<dyn Document>),
                    )
                }
            };

        let resolver = self
            .resolver
            .unwrap_or_else(|| Arc::new(ScriptRegistry::new()));

        tracing::debug!(
            routes = routes.len(),
            modules = self.config.modules.len(),
            mount_points = self.mount_points.len(),
            "Navigator built"
        );

        let collaborators = Collaborators {
            container: self.container.unwrap_or_else(Element::div),
            mount_points: self.mount_points,
            resolver,
            history,
            document,
        };

        Ok(Navigator::from_inner(Arc::new(Inner::new(
            routes,
            self.config,
            collaborators,
            self.hooks,
        ))))
    }
}
