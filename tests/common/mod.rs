//! Shared utilities for navigator integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::Notify;

use page_navigator::config::NavigatorConfig;
use page_navigator::dom::Element;
use page_navigator::history::MemoryBrowser;
use page_navigator::navigator::{NavigationError, Navigator, NavigatorBuilder};
use page_navigator::view::{ScriptRegistry, View, ViewError, ViewOptions};

/// Shared, ordered record of lifecycle calls across views.
pub type EventLog = Arc<Mutex<Vec<String>>>;

/// A page or module that records every lifecycle call.
pub struct MockView {
    pub name: String,
    pub el: Element,
    loads: AtomicUsize,
    fetches: AtomicUsize,
    templates: AtomicUsize,
    shows: AtomicUsize,
    hides: AtomicUsize,
    errors: AtomicUsize,
    destroys: AtomicUsize,
    fail_load: AtomicBool,
    fail_fetch: AtomicBool,
    pending_load: AtomicBool,
    title: Mutex<Option<String>>,
    load_gate: Mutex<Option<Arc<Notify>>>,
    fetch_gate: Mutex<Option<Arc<Notify>>>,
    loaded_at: Mutex<Option<Instant>>,
    shown_at: Mutex<Option<Instant>>,
    constructed: Mutex<Vec<(Element, ViewOptions)>>,
    log: Mutex<Option<EventLog>>,
}

impl MockView {
    pub fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            el: Element::div(),
            loads: AtomicUsize::new(0),
            fetches: AtomicUsize::new(0),
            templates: AtomicUsize::new(0),
            shows: AtomicUsize::new(0),
            hides: AtomicUsize::new(0),
            errors: AtomicUsize::new(0),
            destroys: AtomicUsize::new(0),
            fail_load: AtomicBool::new(false),
            fail_fetch: AtomicBool::new(false),
            pending_load: AtomicBool::new(false),
            title: Mutex::new(None),
            load_gate: Mutex::new(None),
            fetch_gate: Mutex::new(None),
            loaded_at: Mutex::new(None),
            shown_at: Mutex::new(None),
            constructed: Mutex::new(Vec::new()),
            log: Mutex::new(None),
        })
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn templates(&self) -> usize {
        self.templates.load(Ordering::SeqCst)
    }

    pub fn shows(&self) -> usize {
        self.shows.load(Ordering::SeqCst)
    }

    pub fn hides(&self) -> usize {
        self.hides.load(Ordering::SeqCst)
    }

    pub fn errors(&self) -> usize {
        self.errors.load(Ordering::SeqCst)
    }

    pub fn destroys(&self) -> usize {
        self.destroys.load(Ordering::SeqCst)
    }

    pub fn set_fail_load(&self, fail: bool) {
        self.fail_load.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_fetch(&self, fail: bool) {
        self.fail_fetch.store(fail, Ordering::SeqCst);
    }

    /// `load()` never resolves.
    pub fn set_pending_load(&self) {
        self.pending_load.store(true, Ordering::SeqCst);
    }

    pub fn set_title(&self, title: &str) {
        *self.title.lock() = Some(title.to_string());
    }

    /// `load()` waits for the gate to be notified.
    pub fn gate_load(&self, gate: Arc<Notify>) {
        *self.load_gate.lock() = Some(gate);
    }

    /// `fetch_data()` waits for the gate to be notified.
    pub fn gate_fetch(&self, gate: Arc<Notify>) {
        *self.fetch_gate.lock() = Some(gate);
    }

    pub fn record_to(&self, log: &EventLog) {
        *self.log.lock() = Some(log.clone());
    }

    /// Time between the end of `load()` and the start of `show()`.
    pub fn load_to_show(&self) -> Option<Duration> {
        let loaded = (*self.loaded_at.lock())?;
        let shown = (*self.shown_at.lock())?;
        Some(shown.duration_since(loaded))
    }

    /// Arguments of every factory call that produced this view.
    pub fn constructions(&self) -> Vec<(Element, ViewOptions)> {
        self.constructed.lock().clone()
    }

    pub fn last_options(&self) -> Option<ViewOptions> {
        self.constructed.lock().last().map(|(_, options)| options.clone())
    }

    fn record(&self, event: &str) {
        let log = self.log.lock().clone();
        if let Some(log) = log {
            log.lock().push(format!("{}.{}", self.name, event));
        }
    }
}

#[async_trait]
impl View for MockView {
    fn el(&self) -> Element {
        self.el.clone()
    }

    fn title(&self) -> Option<String> {
        self.title.lock().clone()
    }

    async fn load(&self) -> Result<(), ViewError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.record("load");
        if self.pending_load.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        let gate = self.load_gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.fail_load.load(Ordering::SeqCst) {
            return Err(ViewError::new(format!("{} failed to load", self.name)));
        }
        *self.loaded_at.lock() = Some(Instant::now());
        Ok(())
    }

    async fn fetch_data(&self) -> Result<Value, ViewError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.record("fetch_data");
        let gate = self.fetch_gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(ViewError::new(format!("{} failed to fetch", self.name)));
        }
        *self.loaded_at.lock() = Some(Instant::now());
        Ok(Value::Null)
    }

    async fn template(&self) -> Result<Option<String>, ViewError> {
        self.templates.fetch_add(1, Ordering::SeqCst);
        Ok(Some(format!("<section>{}</section>", self.name)))
    }

    async fn show(&self) -> Result<(), ViewError> {
        self.shows.fetch_add(1, Ordering::SeqCst);
        *self.shown_at.lock() = Some(Instant::now());
        self.record("show");
        Ok(())
    }

    async fn hide(&self) -> Result<(), ViewError> {
        self.hides.fetch_add(1, Ordering::SeqCst);
        self.record("hide");
        Ok(())
    }

    async fn error(&self, _err: &ViewError) {
        self.errors.fetch_add(1, Ordering::SeqCst);
        self.record("error");
    }

    fn destroy(&self) {
        self.destroys.fetch_add(1, Ordering::SeqCst);
        self.record("destroy");
    }
}

/// Register a factory that always returns `view`, recording its arguments.
pub fn register(scripts: &ScriptRegistry, script_id: &str, view: &Arc<MockView>) {
    let view = view.clone();
    scripts.register_factory(script_id, move |el, options| {
        view.constructed.lock().push((el, options));
        Ok(view.clone() as Arc<dyn View>)
    });
}

/// Register a factory that builds a new view on every call.
pub fn register_fresh(scripts: &ScriptRegistry, script_id: &str) -> Arc<Mutex<Vec<Arc<MockView>>>> {
    let built: Arc<Mutex<Vec<Arc<MockView>>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = built.clone();
    let name = script_id.to_string();
    scripts.register_factory(script_id, move |el, options| {
        let view = MockView::new(&name);
        view.constructed.lock().push((el, options));
        sink.lock().push(view.clone());
        Ok(view as Arc<dyn View>)
    });
    built
}

/// A started navigator with recording hooks.
pub struct Harness {
    pub navigator: Navigator,
    pub browser: Arc<MemoryBrowser>,
    pub container: Element,
    pub errors: Arc<Mutex<Vec<NavigationError>>>,
    pub route_changes: Arc<Mutex<Vec<String>>>,
    pub page_loads: Arc<Mutex<Vec<String>>>,
}

impl Harness {
    pub fn new(config: NavigatorConfig, scripts: &ScriptRegistry) -> Self {
        Self::with(config, scripts, |builder| builder)
    }

    /// Like `new`, with extra builder configuration.
    pub fn with<F>(config: NavigatorConfig, scripts: &ScriptRegistry, customize: F) -> Self
    where
        F: FnOnce(NavigatorBuilder) -> NavigatorBuilder,
    {
        let browser = Arc::new(MemoryBrowser::new().with_title("Original"));
        let container = Element::div();
        let errors = Arc::new(Mutex::new(Vec::new()));
        let route_changes = Arc::new(Mutex::new(Vec::new()));
        let page_loads = Arc::new(Mutex::new(Vec::new()));

        let error_sink = errors.clone();
        let change_sink = route_changes.clone();
        let load_sink = page_loads.clone();
        let builder = Navigator::builder(config)
            .container(container.clone())
            .browser(browser.clone())
            .resolver(scripts.clone())
            .on_route_error(move |_, err| error_sink.lock().push(err.clone()))
            .on_route_change(move |_, path| change_sink.lock().push(path.to_string()))
            .on_page_load(move |_, path| load_sink.lock().push(path.to_string()));

        let navigator = customize(builder).build().unwrap();
        navigator.start().unwrap();

        Self {
            navigator,
            browser,
            container,
            errors,
            route_changes,
            page_loads,
        }
    }

    pub async fn go(&self, path: &str) {
        self.navigator
            .trigger_route(path, page_navigator::NavigateOptions::default())
            .await;
    }

    pub fn errors(&self) -> Vec<NavigationError> {
        self.errors.lock().clone()
    }
}

/// Poll `condition` until it holds or about a second passes.
pub async fn wait_until<F: Fn() -> bool>(condition: F) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}
