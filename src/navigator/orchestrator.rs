//! The navigation orchestrator.
//!
//! # Responsibilities
//! - Resolve a path, load its page and modules, and swap the visible page
//! - Keep page and global module caches consistent across navigations
//! - Keep history, document title and link interception in step
//!
//! # Design Decisions
//! - Application failures never escape: they go to `on_route_error` or
//!   to the failing module's `error()`
//! - Loading runs concurrently; the visible tail of a navigation runs
//!   under one view lock and is skipped when a newer navigation exists
//! - No sync lock is held across an await; entries are cloned out

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use futures::future::{join, join_all};
use parking_lot::Mutex;
use serde_json::{Map, Value};
use tokio::runtime::Handle;
use tokio::sync::mpsc;

use crate::cache::{GlobalModuleEntry, GlobalModuleRegistry, ModuleSlot, PageCache, PageEntry, PageModule};
use crate::config::schema::{DisplayConfig, ModuleDefinition, NavigatorConfig, RouteDefinition};
use crate::dom::{ClickEvent, ClickListener, Element, ListenerId};
use crate::history::{parse_query, Document, HistoryAdapter, HistoryState, PopStateEvent};
use crate::navigator::builder::NavigatorBuilder;
use crate::navigator::error::NavigationError;
use crate::navigator::hooks::{Hooks, LoadOutcome, NavigateOptions, RegisterOptions};
use crate::navigator::worker::{self, Intent, Shutdown};
use crate::observability::metrics;
use crate::routing::matcher::normalize_path;
use crate::routing::{RouteMatch, RouteTable};
use crate::view::options::merge_request_options;
use crate::view::{PageClasses, PlainView, ScriptResolver, View, ViewError, ViewOptions};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Lifecycle {
    #[default]
    Idle,
    Running,
    Stopped,
}

/// External collaborators supplied by the builder.
pub(crate) struct Collaborators {
    pub container: Element,
    pub mount_points: HashMap<String, Element>,
    pub resolver: Arc<dyn ScriptResolver>,
    pub history: Arc<dyn HistoryAdapter>,
    pub document: Arc<dyn Document>,
}

#[derive(Default)]
struct NavState {
    lifecycle: Lifecycle,
    active_page: Option<String>,
    current_url: Option<String>,
    original_title: Option<String>,
    intents: Option<mpsc::UnboundedSender<Intent>>,
    popstate: Option<ListenerId>,
    shutdown: Option<Shutdown>,
    link_bindings: Vec<(Element, ListenerId)>,
}

pub(crate) struct Inner {
    routes: RouteTable,
    modules: BTreeMap<String, ModuleDefinition>,
    request_options: Map<String, Value>,
    display: DisplayConfig,
    container: Element,
    mount_points: HashMap<String, Element>,
    resolver: Arc<dyn ScriptResolver>,
    history: Arc<dyn HistoryAdapter>,
    document: Arc<dyn Document>,
    hooks: Hooks,
    pages: PageCache,
    globals: GlobalModuleRegistry,
    state: Mutex<NavState>,
    view_lock: tokio::sync::Mutex<()>,
    sequence: AtomicU64,
}

impl Inner {
    pub(crate) fn new(
        routes: RouteTable,
        config: NavigatorConfig,
        collaborators: Collaborators,
        hooks: Hooks,
    ) -> Self {
        Self {
            routes,
            modules: config.modules,
            request_options: config.request_options,
            display: config.display,
            container: collaborators.container,
            mount_points: collaborators.mount_points,
            resolver: collaborators.resolver,
            history: collaborators.history,
            document: collaborators.document,
            hooks,
            pages: PageCache::new(),
            globals: GlobalModuleRegistry::new(),
            state: Mutex::new(NavState::default()),
            view_lock: tokio::sync::Mutex::new(()),
            sequence: AtomicU64::new(0),
        }
    }
}

/// A module resolved for one navigation.
struct ModuleRef {
    slot: ModuleSlot,
    global: Option<GlobalModuleEntry>,
}

/// Client-side navigation engine.
///
/// Cloning yields another handle to the same navigator.
#[derive(Clone)]
pub struct Navigator {
    inner: Arc<Inner>,
}

impl Navigator {
    pub fn builder(config: NavigatorConfig) -> NavigatorBuilder {
        NavigatorBuilder::new(config)
    }

    pub(crate) fn from_inner(inner: Arc<Inner>) -> Self {
        Self { inner }
    }

    /// Element pages are attached to.
    pub fn container(&self) -> &Element {
        &self.inner.container
    }

    pub fn pages(&self) -> &PageCache {
        &self.inner.pages
    }

    pub fn global_modules(&self) -> &GlobalModuleRegistry {
        &self.inner.globals
    }

    /// Route key of the visible page.
    pub fn active_page(&self) -> Option<String> {
        self.inner.state.lock().active_page.clone()
    }

    pub fn is_running(&self) -> bool {
        self.inner.state.lock().lifecycle == Lifecycle::Running
    }

    /// Capture the document title, subscribe to popstate and start the
    /// intent worker. Must be called inside a tokio runtime.
    pub fn start(&self) -> Result<(), NavigationError> {
        let handle = Handle::try_current().map_err(|_| NavigationError::NoRuntime)?;

        let mut state = self.inner.state.lock();
        match state.lifecycle {
            Lifecycle::Running => return Err(NavigationError::AlreadyStarted),
            Lifecycle::Stopped => return Err(NavigationError::Stopped),
            Lifecycle::Idle => {}
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let popstate_tx = tx.clone();
        let popstate = self
            .inner
            .history
            .add_popstate_listener(Arc::new(move |event: &PopStateEvent| match event.path() {
                Some(path) => {
                    if popstate_tx.send(Intent::popstate(path)).is_err() {
                        tracing::debug!(path = %path, "Popstate after shutdown, ignoring");
                    }
                }
                None => tracing::debug!("Popstate without a path, ignoring"),
            }));

        let shutdown = Shutdown::new();
        handle.spawn(worker::run(Arc::downgrade(&self.inner), rx, shutdown.subscribe()));

        state.original_title = Some(self.inner.document.title());
        state.intents = Some(tx);
        state.popstate = Some(popstate);
        state.shutdown = Some(shutdown);
        state.lifecycle = Lifecycle::Running;
        drop(state);

        tracing::info!(
            routes = self.inner.routes.len(),
            modules = self.inner.modules.len(),
            "Navigator started"
        );
        Ok(())
    }

    /// Unsubscribe from popstate and links and stop the worker.
    /// Caches are left as they are.
    pub fn stop(&self) {
        let (popstate, bindings, shutdown) = {
            let mut state = self.inner.state.lock();
            if state.lifecycle == Lifecycle::Stopped {
                return;
            }
            state.lifecycle = Lifecycle::Stopped;
            state.intents = None;
            (
                state.popstate.take(),
                std::mem::take(&mut state.link_bindings),
                state.shutdown.take(),
            )
        };

        if let Some(id) = popstate {
            self.inner.history.remove_popstate_listener(id);
        }
        unbind(bindings);
        if let Some(shutdown) = shutdown {
            shutdown.trigger();
        }

        tracing::info!(
            pages = self.inner.pages.len(),
            global_modules = self.inner.globals.len(),
            "Navigator stopped"
        );
    }

    /// Navigate to `path`.
    ///
    /// Returns once the navigation has settled. Unknown routes and page or
    /// module failures are reported through hooks, never returned. The
    /// requested path is registered even when no route matches it.
    pub async fn trigger_route(&self, path: &str, options: NavigateOptions) {
        tracing::debug!(
            path = %path,
            replace = options.replace,
            trigger_url_change = options.trigger_url_change,
            "Navigation requested"
        );
        if let Some(hook) = &self.inner.hooks.on_route_change {
            hook(self, path);
        }

        let register = RegisterOptions { replace: options.replace };
        if self.inner.routes.resolve(path).is_none() {
            if options.trigger_url_change {
                self.register_url(path, register);
            }
            self.route_not_found(path);
            return;
        }

        let target = self.request_target(path).await;

        if options.trigger_url_change {
            self.register_url(path, register);
        }

        let outcome = self.load_page(&target, &options).await;

        if target != path && options.trigger_url_change && outcome != LoadOutcome::NotFound {
            self.register_url(&target, RegisterOptions::default());
        }
    }

    async fn request_target(&self, path: &str) -> String {
        let Some(hook) = self.inner.hooks.on_route_request.clone() else {
            return path.to_string();
        };
        match hook(self, path).await {
            Some(target) if target != path => {
                tracing::debug!(from = %path, to = %target, "Navigation redirected");
                target
            }
            _ => path.to_string(),
        }
    }

    /// Load the page for `path` with its modules and make it visible.
    pub async fn load_page(&self, path: &str, options: &NavigateOptions) -> LoadOutcome {
        let Some(matched) = self.inner.routes.resolve(path) else {
            self.route_not_found(path);
            return LoadOutcome::NotFound;
        };
        let seq = self.inner.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let signature = options
            .data
            .clone()
            .or_else(|| matched.data_url().map(Value::String));

        let (entry, replaces_cached) = match self.page_entry(&matched, signature) {
            Ok(found) => found,
            Err(err) => {
                self.page_failed(path, &matched.key, None, err).await;
                return LoadOutcome::Failed;
            }
        };

        let modules = self.resolve_modules(&entry);
        self.compose(&entry.el(), &modules, true);

        let (page_result, _) = join(
            entry.ensure_loaded(),
            join_all(modules.iter().map(|module| module.slot.ensure_ready())),
        )
        .await;

        if let Err(err) = page_result {
            self.page_failed(path, &matched.key, Some(&entry), err).await;
            return LoadOutcome::Failed;
        }

        if replaces_cached {
            self.swap_page(&entry);
        }

        tracing::debug!(path = %path, key = %matched.key, "Page loaded");
        metrics::record_page_load(true);
        if let Some(hook) = &self.inner.hooks.on_page_load {
            hook(self, path);
        }

        if self.present(seq, &entry, &modules).await {
            metrics::record_navigation("completed");
            LoadOutcome::Loaded
        } else {
            metrics::record_navigation("superseded");
            LoadOutcome::Superseded
        }
    }

    /// Show an already loaded page without hiding the current one.
    pub async fn show_page(&self, path: &str) -> Result<(), NavigationError> {
        let key = normalize_path(path);
        let entry = self
            .inner
            .pages
            .get(key)
            .ok_or_else(|| NavigationError::PageNotLoaded(key.to_string()))?;
        entry
            .ensure_loaded()
            .await
            .map_err(|source| NavigationError::PageLoad {
                path: path.to_string(),
                source,
            })?;

        let modules = self.resolve_modules(&entry);
        join_all(modules.iter().map(|module| module.slot.ensure_ready())).await;

        self.inner.sequence.fetch_add(1, Ordering::SeqCst);
        let _view = self.inner.view_lock.lock().await;
        self.reveal(&entry, &modules).await;
        Ok(())
    }

    /// Hide a page, its modules and every active global module, then
    /// detach its element.
    pub async fn hide_page(&self, path: &str) -> Result<(), NavigationError> {
        let key = normalize_path(path);
        let entry = self
            .inner
            .pages
            .get(key)
            .ok_or_else(|| NavigationError::PageNotLoaded(key.to_string()))?;

        let _view = self.inner.view_lock.lock().await;
        self.hide_towards(Some(&entry), None).await;
        let bindings = self.deactivate(key);
        unbind(bindings);
        Ok(())
    }

    /// Destroy every cached page except the visible one, and every global
    /// module the visible page does not declare.
    pub fn reset(&self) {
        let active = self.active_page();
        let required: HashSet<String> = active
            .as_deref()
            .and_then(|key| self.inner.pages.get(key))
            .map(|entry| entry.definition().modules.iter().cloned().collect())
            .unwrap_or_default();

        let mut pages = 0;
        for key in self.inner.pages.keys() {
            if active.as_deref() == Some(key.as_str()) {
                continue;
            }
            if let Some(entry) = self.inner.pages.remove(&key) {
                destroy_page(&entry);
                pages += 1;
            }
        }

        let mut modules = 0;
        for name in self.inner.globals.names() {
            if required.contains(&name) {
                continue;
            }
            if let Some(entry) = self.inner.globals.remove(&name) {
                self.retire_global(&entry);
                modules += 1;
            }
        }

        tracing::info!(pages, global_modules = modules, "Caches reset");
    }

    /// Destroy and evict the named pages, visible or not.
    pub fn reset_page<I, S>(&self, paths: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for path in paths {
            let key = normalize_path(path.as_ref());
            let Some(entry) = self.inner.pages.remove(key) else {
                tracing::debug!(key = %key, "Reset requested for a page that is not cached");
                continue;
            };
            let bindings = self.deactivate(key);
            unbind(bindings);
            destroy_page(&entry);
            tracing::debug!(key = %key, "Page reset");
        }
    }

    /// Destroy and evict the named global modules.
    pub fn reset_global_module<I, S>(&self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            let name = name.as_ref();
            match self.inner.globals.remove(name) {
                Some(entry) => {
                    self.retire_global(&entry);
                    tracing::debug!(module = %name, "Global module reset");
                }
                None => tracing::debug!(module = %name, "Reset requested for a module that is not cached"),
            }
        }
    }

    /// Query parameters of `url`, or of the current location.
    pub fn get_query_params(&self, url: Option<&str>) -> HashMap<String, String> {
        let location = self.inner.history.location();
        parse_query(url.unwrap_or(&location.href), &location.href)
    }

    /// The last registered path without a leading slash. Before any
    /// registration, the location hash, or else its pathname.
    pub fn get_relative_url(&self) -> String {
        let current = self.inner.state.lock().current_url.clone();
        if let Some(url) = current {
            return url;
        }

        let location = self.inner.history.location();
        let raw = if location.hash.is_empty() {
            location.pathname
        } else {
            location.hash.trim_start_matches('#').to_string()
        };
        raw.strip_prefix('/').unwrap_or(&raw).to_string()
    }

    /// Segments of [`get_relative_url`](Self::get_relative_url).
    pub fn get_relative_url_params(&self) -> Vec<String> {
        self.get_relative_url()
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Definition of the first route matching `path`.
    pub fn page_config_by_path(&self, path: &str) -> Option<Arc<RouteDefinition>> {
        self.inner.routes.resolve(path).map(|matched| matched.definition)
    }

    /// Write `path` to history and make it the current relative URL.
    pub fn register_url(&self, path: &str, options: RegisterOptions) {
        let state = HistoryState::for_path(path);
        if options.replace {
            self.inner.history.replace_state(state, "", path);
        } else {
            self.inner.history.push_state(state, "", path);
        }

        let relative = path.strip_prefix('/').unwrap_or(path).to_string();
        self.inner.state.lock().current_url = Some(relative);
        tracing::debug!(path = %path, replace = options.replace, "URL registered");
    }

    fn report(&self, err: NavigationError) {
        if let Some(hook) = &self.inner.hooks.on_route_error {
            hook(self, &err);
        }
    }

    fn route_not_found(&self, path: &str) {
        tracing::warn!(path = %path, "No route matches");
        metrics::record_navigation("not_found");
        self.report(NavigationError::RouteNotFound(path.to_string()));
    }

    async fn page_failed(&self, path: &str, key: &str, entry: Option<&PageEntry>, err: ViewError) {
        tracing::warn!(path = %path, error = %err, "Page failed to load");
        metrics::record_page_load(false);
        metrics::record_navigation("failed");

        if let Some(entry) = entry {
            self.inner.pages.remove_if_generation(key, entry.generation());
        }
        self.report(NavigationError::PageLoad {
            path: path.to_string(),
            source: err,
        });

        let failed = entry.map(PageEntry::generation);
        let _view = self.inner.view_lock.lock().await;
        let previous = self
            .active_page()
            .and_then(|active| self.inner.pages.get(&active))
            .filter(|previous| Some(previous.generation()) != failed);
        if let Some(previous) = previous {
            tracing::debug!(key = %previous.key(), "Restoring previous page");
            if let Err(err) = previous.instance().show().await {
                tracing::warn!(key = %previous.key(), error = %err, "Previous page failed to show");
            }
        }
    }

    /// Cached entry for the match, or a new one when absent or when the
    /// data signature changed.
    ///
    /// The flag is set when the new entry replaces a cached one. Such an
    /// entry is only cached by [`swap_page`](Self::swap_page) once it has
    /// loaded, so a failure leaves the cached page in place.
    fn page_entry(&self, matched: &RouteMatch, signature: Option<Value>) -> Result<(PageEntry, bool), ViewError> {
        let existing = self.inner.pages.get(&matched.key);
        if let Some(existing) = &existing {
            if existing.signature() == signature.as_ref() {
                tracing::debug!(key = %matched.key, "Reusing cached page");
                return Ok((existing.clone(), false));
            }
            tracing::debug!(key = %matched.key, "Page data changed, reloading");
        }

        let definition = &matched.definition;
        let options = self.page_options(definition, signature.clone());
        let instance = self.instantiate(definition.script_id.as_deref(), Element::div(), options)?;

        let el = instance.el();
        el.add_class(&self.inner.display.page_class);
        for class in definition.css_classes() {
            el.add_class(class);
        }

        let entry = PageEntry::new(
            matched.key.clone(),
            definition.clone(),
            instance,
            signature,
            self.page_modules(definition),
            self.inner.pages.next_generation(),
        );
        if existing.is_some() {
            return Ok((entry, true));
        }
        Ok((self.inner.pages.get_or_insert(entry), false))
    }

    /// Cache a loaded replacement and destroy the entry it displaces.
    fn swap_page(&self, entry: &PageEntry) {
        let Some(stale) = self.inner.pages.insert(entry.clone()) else {
            return;
        };
        if stale.generation() == entry.generation() {
            return;
        }
        let bindings = self.deactivate(stale.key());
        unbind(bindings);
        destroy_page(&stale);
        tracing::debug!(key = %entry.key(), "Replaced cached page");
    }

    fn page_options(&self, definition: &RouteDefinition, data: Option<Value>) -> ViewOptions {
        let display = &self.inner.display;
        ViewOptions {
            data,
            request_options: merge_request_options([&self.inner.request_options, &definition.request_options]),
            template: definition.template.clone(),
            styles: definition.styles.clone(),
            title: definition.title.clone(),
            classes: Some(PageClasses {
                active_class: display.active_class.clone(),
                loaded_class: display.loaded_class.clone(),
                disabled_class: display.disabled_class.clone(),
                error_class: display.error_class.clone(),
            }),
            extra: definition.extra.clone(),
        }
    }

    fn module_options(&self, module: &ModuleDefinition, page: Option<&RouteDefinition>) -> ViewOptions {
        let mut layers = vec![&self.inner.request_options];
        if let Some(page) = page {
            layers.push(&page.request_options);
        }
        layers.push(&module.request_options);

        ViewOptions {
            request_options: merge_request_options(layers),
            template: module.template.clone(),
            extra: module.options.clone(),
            ..ViewOptions::default()
        }
    }

    fn instantiate(
        &self,
        script_id: Option<&str>,
        el: Element,
        options: ViewOptions,
    ) -> Result<Arc<dyn View>, ViewError> {
        let Some(script_id) = script_id else {
            return Ok(Arc::new(PlainView::new(el)));
        };
        let resolved = self
            .inner
            .resolver
            .resolve(script_id)
            .ok_or_else(|| ViewError::new(format!("script '{script_id}' could not be resolved")))?;
        resolved.instantiate(el, options)
    }

    /// Page-scoped instances plus references to globals, in declared order.
    fn page_modules(&self, definition: &RouteDefinition) -> Vec<PageModule> {
        definition
            .modules
            .iter()
            .filter_map(|name| {
                let Some(module) = self.inner.modules.get(name) else {
                    tracing::warn!(page = %definition.pattern, module = %name, "Page references an unknown module");
                    return None;
                };
                if module.global {
                    return Some(PageModule::Global(name.clone()));
                }

                let options = self.module_options(module, Some(definition));
                match self.instantiate(module.script_id.as_deref(), Element::div(), options) {
                    Ok(instance) => Some(PageModule::Scoped(ModuleSlot::new(name.clone(), instance))),
                    Err(err) => {
                        tracing::warn!(module = %name, error = %err, "Module could not be constructed, skipping");
                        metrics::record_module_failure(name);
                        None
                    }
                }
            })
            .collect()
    }

    fn global_module(&self, name: &str) -> Option<GlobalModuleEntry> {
        let module = self.inner.modules.get(name)?;
        let result = self.inner.globals.get_or_try_insert_with(name, || {
            let mount = module.el.as_deref().and_then(|mount| {
                let el = self.inner.mount_points.get(mount).cloned();
                if el.is_none() {
                    tracing::warn!(module = %name, mount_point = %mount, "Mount point not registered, using a detached element");
                }
                el
            });
            let fixed = mount.is_some();
            let el = mount.unwrap_or_else(Element::div);

            let instance = self.instantiate(module.script_id.as_deref(), el, self.module_options(module, None))?;
            let slot = ModuleSlot::new(name, instance);
            tracing::debug!(module = %name, fixed_mount = fixed, "Global module created");
            Ok(if fixed { slot.with_fixed_mount() } else { slot })
        });

        match result {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::warn!(module = %name, error = %err, "Global module could not be constructed, skipping");
                metrics::record_module_failure(name);
                None
            }
        }
    }

    fn resolve_modules(&self, entry: &PageEntry) -> Vec<ModuleRef> {
        entry
            .modules()
            .iter()
            .filter_map(|module| match module {
                PageModule::Scoped(slot) => Some(ModuleRef {
                    slot: slot.clone(),
                    global: None,
                }),
                PageModule::Global(name) => self.global_module(name).map(|global| ModuleRef {
                    slot: global.slot().clone(),
                    global: Some(global),
                }),
            })
            .collect()
    }

    /// Append module elements to the page element in declared order.
    ///
    /// With `pending`, globals still visible elsewhere stay where they are.
    fn compose(&self, page_el: &Element, modules: &[ModuleRef], pending: bool) {
        for module in modules {
            if module.slot.has_fixed_mount() {
                continue;
            }
            if pending && module.global.as_ref().is_some_and(GlobalModuleEntry::is_active) {
                continue;
            }
            page_el.append_child(&module.slot.el());
        }
    }

    /// The visible tail of a navigation. False if a newer one superseded it.
    async fn present(&self, seq: u64, entry: &PageEntry, modules: &[ModuleRef]) -> bool {
        let _view = self.inner.view_lock.lock().await;
        if self.inner.sequence.load(Ordering::SeqCst) != seq {
            tracing::debug!(key = %entry.key(), "Navigation superseded, leaving view untouched");
            return false;
        }

        let previous = self
            .active_page()
            .filter(|active| active != entry.key())
            .and_then(|active| self.inner.pages.get(&active));
        self.hide_towards(previous.as_ref(), Some(entry.definition().as_ref())).await;

        self.reveal(entry, modules).await;
        true
    }

    /// Hide the previous page, then global modules `next` does not declare,
    /// then detach the previous element.
    async fn hide_towards(&self, previous: Option<&PageEntry>, next: Option<&RouteDefinition>) {
        if let Some(previous) = previous {
            let scoped = join_all(previous.scoped_modules().filter(|slot| slot.is_ready()).map(|slot| async move {
                if let Err(err) = slot.instance().hide().await {
                    tracing::warn!(module = %slot.name(), error = %err, "Module hide failed");
                }
            }));
            let (page, _) = join(previous.instance().hide(), scoped).await;
            if let Err(err) = page {
                tracing::warn!(key = %previous.key(), error = %err, "Page hide failed");
            }
        }

        let stale: Vec<GlobalModuleEntry> = self
            .inner
            .globals
            .active_entries()
            .into_iter()
            .filter(|global| !next.is_some_and(|def| def.modules.iter().any(|name| name == global.slot().name())))
            .collect();
        join_all(stale.iter().map(|global| async move {
            global.set_active(false);
            if let Err(err) = global.slot().instance().hide().await {
                tracing::warn!(module = %global.slot().name(), error = %err, "Global module hide failed");
            }
        }))
        .await;

        if let Some(previous) = previous {
            previous.el().detach();
        }
    }

    /// Attach, compose, wait the show delay, show, set the title and bind
    /// links. Caller holds the view lock.
    async fn reveal(&self, entry: &PageEntry, modules: &[ModuleRef]) {
        let page_el = entry.el();
        self.inner.container.append_child(&page_el);
        self.compose(&page_el, modules, false);
        self.inner.state.lock().active_page = Some(entry.key().to_string());

        tokio::time::sleep(Duration::from_millis(self.inner.display.show_delay_ms)).await;

        let shows = modules.iter().filter(|module| module.slot.is_ready()).map(|module| async move {
            match module.slot.instance().show().await {
                Ok(()) => {
                    if let Some(global) = &module.global {
                        global.set_active(true);
                    }
                }
                Err(err) => {
                    tracing::warn!(module = %module.slot.name(), error = %err, "Module show failed");
                }
            }
        });
        let (page, _) = join(entry.instance().show(), join_all(shows)).await;
        if let Err(err) = page {
            tracing::warn!(key = %entry.key(), error = %err, "Page show failed");
        }

        self.update_title(entry);
        self.bind_links(&page_el);
        tracing::debug!(key = %entry.key(), "Page shown");
    }

    fn update_title(&self, entry: &PageEntry) {
        let title = entry
            .instance()
            .title()
            .or_else(|| entry.definition().title.clone())
            .or_else(|| self.inner.state.lock().original_title.clone());
        if let Some(title) = title {
            self.inner.document.set_title(&title);
        }
    }

    /// Intercept anchor clicks on the page and active global modules only.
    fn bind_links(&self, page_el: &Element) {
        let mut hosts = vec![page_el.clone()];
        hosts.extend(self.inner.globals.active_entries().iter().map(|global| global.slot().el()));

        let bindings: Vec<(Element, ListenerId)> = hosts
            .into_iter()
            .map(|host| {
                let id = host.add_click_listener(link_listener(Arc::downgrade(&self.inner)));
                (host, id)
            })
            .collect();

        let previous = std::mem::replace(&mut self.inner.state.lock().link_bindings, bindings);
        unbind(previous);
    }

    /// Drop the module's link bindings, then destroy it.
    fn retire_global(&self, entry: &GlobalModuleEntry) {
        let el = entry.slot().el();
        let released: Vec<(Element, ListenerId)> = {
            let mut state = self.inner.state.lock();
            let (released, kept) = std::mem::take(&mut state.link_bindings)
                .into_iter()
                .partition(|(host, _)| *host == el);
            state.link_bindings = kept;
            released
        };
        unbind(released);
        destroy_global(entry);
    }

    /// Clear the active page if it is `key`, returning link bindings to drop.
    fn deactivate(&self, key: &str) -> Vec<(Element, ListenerId)> {
        let mut state = self.inner.state.lock();
        if state.active_page.as_deref() != Some(key) {
            return Vec::new();
        }
        state.active_page = None;
        std::mem::take(&mut state.link_bindings)
    }
}

impl fmt::Debug for Navigator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("Navigator")
            .field("lifecycle", &state.lifecycle)
            .field("active_page", &state.active_page)
            .field("pages", &self.inner.pages.len())
            .field("global_modules", &self.inner.globals.len())
            .finish()
    }
}

fn link_listener(inner: Weak<Inner>) -> ClickListener {
    Arc::new(move |event: &mut ClickEvent| {
        if event.default_prevented() {
            return;
        }
        let Some(href) = event.closest_anchor().and_then(|anchor| anchor.attribute("href")) else {
            return;
        };
        let Some(inner) = inner.upgrade() else {
            return;
        };
        let Some(intents) = inner.state.lock().intents.clone() else {
            return;
        };

        event.prevent_default();
        if intents.send(Intent::link(href.clone())).is_err() {
            tracing::debug!(href = %href, "Link intercepted after shutdown");
        } else {
            tracing::debug!(href = %href, "Link intercepted");
        }
    })
}

fn unbind(bindings: Vec<(Element, ListenerId)>) {
    for (el, id) in bindings {
        el.remove_click_listener(id);
    }
}

fn destroy_page(entry: &PageEntry) {
    entry.el().detach();
    for slot in entry.scoped_modules() {
        slot.instance().destroy();
    }
    entry.instance().destroy();
}

fn destroy_global(entry: &GlobalModuleEntry) {
    entry.set_active(false);
    if !entry.slot().has_fixed_mount() {
        entry.slot().el().detach();
    }
    entry.slot().instance().destroy();
}
