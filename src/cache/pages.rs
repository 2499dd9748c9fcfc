//! Page cache.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::OnceCell;

use crate::cache::modules::ModuleSlot;
use crate::config::schema::RouteDefinition;
use crate::dom::Element;
use crate::observability::metrics;
use crate::view::{View, ViewError};

/// A module of a page, in declaration order.
#[derive(Clone, Debug)]
pub enum PageModule {
    /// Instantiated for this page load only.
    Scoped(ModuleSlot),
    /// Looked up in the global registry by name.
    Global(String),
}

/// A cached page instance.
#[derive(Clone)]
pub struct PageEntry {
    key: String,
    definition: Arc<RouteDefinition>,
    instance: Arc<dyn View>,
    signature: Option<Value>,
    modules: Vec<PageModule>,
    load: Arc<OnceCell<Result<(), ViewError>>>,
    generation: u64,
}

impl PageEntry {
    pub fn new(
        key: impl Into<String>,
        definition: Arc<RouteDefinition>,
        instance: Arc<dyn View>,
        signature: Option<Value>,
        modules: Vec<PageModule>,
        generation: u64,
    ) -> Self {
        Self {
            key: key.into(),
            definition,
            instance,
            signature,
            modules,
            load: Arc::new(OnceCell::new()),
            generation,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn definition(&self) -> &Arc<RouteDefinition> {
        &self.definition
    }

    pub fn instance(&self) -> &Arc<dyn View> {
        &self.instance
    }

    pub fn el(&self) -> Element {
        self.instance.el()
    }

    /// The `data` option the instance was built with.
    pub fn signature(&self) -> Option<&Value> {
        self.signature.as_ref()
    }

    pub fn modules(&self) -> &[PageModule] {
        &self.modules
    }

    /// Page-scoped module slots only.
    pub fn scoped_modules(&self) -> impl Iterator<Item = &ModuleSlot> {
        self.modules.iter().filter_map(|module| match module {
            PageModule::Scoped(slot) => Some(slot),
            PageModule::Global(_) => None,
        })
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Run the page's `load()` once; later callers share the result.
    pub async fn ensure_loaded(&self) -> Result<(), ViewError> {
        self.load
            .get_or_init(|| async { self.instance.load().await })
            .await
            .clone()
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.load.get(), Some(Ok(())))
    }
}

impl std::fmt::Debug for PageEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageEntry")
            .field("key", &self.key)
            .field("signature", &self.signature)
            .field("modules", &self.modules.len())
            .field("generation", &self.generation)
            .finish()
    }
}

/// Pages by route key. At most one entry per key.
#[derive(Clone, Default)]
pub struct PageCache {
    inner: Arc<DashMap<String, PageEntry>>,
    generations: Arc<AtomicU64>,
}

impl PageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp for a new entry; lets a failed load evict only its own entry.
    pub fn next_generation(&self) -> u64 {
        self.generations.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Insert, returning the entry previously under the same key.
    pub fn insert(&self, entry: PageEntry) -> Option<PageEntry> {
        let previous = self.inner.insert(entry.key.clone(), entry);
        metrics::record_cache_size("pages", self.inner.len());
        previous
    }

    /// Insert unless the key is taken; returns whichever entry is cached.
    pub fn get_or_insert(&self, entry: PageEntry) -> PageEntry {
        let cached = self
            .inner
            .entry(entry.key.clone())
            .or_insert(entry)
            .value()
            .clone();
        metrics::record_cache_size("pages", self.inner.len());
        cached
    }

    pub fn get(&self, key: &str) -> Option<PageEntry> {
        self.inner.get(key).map(|entry| entry.value().clone())
    }

    pub fn remove(&self, key: &str) -> Option<PageEntry> {
        let removed = self.inner.remove(key).map(|(_, entry)| entry);
        metrics::record_cache_size("pages", self.inner.len());
        removed
    }

    /// Remove `key` only if it still holds the entry stamped `generation`.
    pub fn remove_if_generation(&self, key: &str, generation: u64) -> Option<PageEntry> {
        let removed = self
            .inner
            .remove_if(key, |_, entry| entry.generation == generation)
            .map(|(_, entry)| entry);
        metrics::record_cache_size("pages", self.inner.len());
        removed
    }

    pub fn keys(&self) -> Vec<String> {
        self.inner.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
