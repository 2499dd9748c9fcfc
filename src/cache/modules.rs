//! Module slots and the global module registry.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::OnceCell;

use crate::dom::Element;
use crate::observability::metrics;
use crate::view::{View, ViewError};

/// A constructed module instance and its one-shot readiness.
#[derive(Clone)]
pub struct ModuleSlot {
    name: String,
    instance: Arc<dyn View>,
    fixed_mount: bool,
    ready: Arc<OnceCell<Result<(), ViewError>>>,
}

impl ModuleSlot {
    pub fn new(name: impl Into<String>, instance: Arc<dyn View>) -> Self {
        Self {
            name: name.into(),
            instance,
            fixed_mount: false,
            ready: Arc::new(OnceCell::new()),
        }
    }

    /// The instance lives in a named mount point, not inside the page.
    pub fn with_fixed_mount(mut self) -> Self {
        self.fixed_mount = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn instance(&self) -> &Arc<dyn View> {
        &self.instance
    }

    pub fn el(&self) -> Element {
        self.instance.el()
    }

    pub fn has_fixed_mount(&self) -> bool {
        self.fixed_mount
    }

    /// Run `load()` then `fetch_data()` once.
    ///
    /// Every caller observes the same result. On failure the module's
    /// `error()` runs exactly once.
    pub async fn ensure_ready(&self) -> Result<(), ViewError> {
        self.ready
            .get_or_init(|| async {
                let result: Result<(), ViewError> = async {
                    self.instance.load().await?;
                    self.instance.fetch_data().await.map(|_| ())
                }
                .await;

                if let Err(err) = &result {
                    tracing::warn!(module = %self.name, error = %err, "Module failed to load");
                    metrics::record_module_failure(&self.name);
                    self.instance.error(err).await;
                }
                result
            })
            .await
            .clone()
    }

    /// Readiness if it has settled.
    pub fn readiness(&self) -> Option<Result<(), ViewError>> {
        self.ready.get().cloned()
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.ready.get(), Some(Ok(())))
    }
}

impl std::fmt::Debug for ModuleSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleSlot")
            .field("name", &self.name)
            .field("fixed_mount", &self.fixed_mount)
            .field("ready", &self.ready.get())
            .finish()
    }
}

/// A global module singleton.
#[derive(Clone, Debug)]
pub struct GlobalModuleEntry {
    slot: ModuleSlot,
    active: Arc<AtomicBool>,
}

impl GlobalModuleEntry {
    pub fn new(slot: ModuleSlot) -> Self {
        Self {
            slot,
            active: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn slot(&self) -> &ModuleSlot {
        &self.slot
    }

    /// Shown and not hidden since.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub fn set_active(&self, active: bool) {
        self.active.store(active, Ordering::SeqCst);
    }
}

/// Global modules by name, persisting across navigations.
#[derive(Clone, Default)]
pub struct GlobalModuleRegistry {
    inner: Arc<DashMap<String, GlobalModuleEntry>>,
}

impl GlobalModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<GlobalModuleEntry> {
        self.inner.get(name).map(|entry| entry.value().clone())
    }

    /// Return the singleton for `name`, constructing it with `create` if absent.
    ///
    /// `create` runs outside the map lock. If two callers race, the first
    /// insert wins and the other instance is dropped unloaded.
    pub fn get_or_try_insert_with<F>(&self, name: &str, create: F) -> Result<GlobalModuleEntry, ViewError>
    where
        F: FnOnce() -> Result<ModuleSlot, ViewError>,
    {
        if let Some(existing) = self.get(name) {
            return Ok(existing);
        }

        let candidate = GlobalModuleEntry::new(create()?);
        let entry = self
            .inner
            .entry(name.to_string())
            .or_insert(candidate)
            .value()
            .clone();
        metrics::record_cache_size("global_modules", self.inner.len());
        Ok(entry)
    }

    pub fn remove(&self, name: &str) -> Option<GlobalModuleEntry> {
        let removed = self.inner.remove(name).map(|(_, entry)| entry);
        metrics::record_cache_size("global_modules", self.inner.len());
        removed
    }

    pub fn names(&self) -> Vec<String> {
        self.inner.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Entries currently shown.
    pub fn active_entries(&self) -> Vec<GlobalModuleEntry> {
        self.inner
            .iter()
            .filter(|entry| entry.value().is_active())
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
