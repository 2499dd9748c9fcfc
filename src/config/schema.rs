//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Root configuration for the navigator.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct NavigatorConfig {
    /// Page routes, tried in declaration order.
    pub pages: Vec<RouteDefinition>,

    /// Module definitions by name.
    pub modules: BTreeMap<String, ModuleDefinition>,

    /// Request options merged into every page and module.
    pub request_options: Map<String, Value>,

    /// Display and CSS class settings.
    pub display: DisplayConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl NavigatorConfig {
    pub fn page(mut self, definition: RouteDefinition) -> Self {
        self.pages.push(definition);
        self
    }

    pub fn module(mut self, name: impl Into<String>, definition: ModuleDefinition) -> Self {
        self.modules.insert(name.into(), definition);
        self
    }

    pub fn request_option(mut self, key: impl Into<String>, value: Value) -> Self {
        self.request_options.insert(key.into(), value);
        self
    }
}

/// A page route.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct RouteDefinition {
    /// Regular expression tested against the path. Not anchored implicitly.
    pub pattern: String,

    /// Script resolved into the page instance. None uses a plain view.
    pub script_id: Option<String>,

    /// URL with `$1`, `$2`… placeholders bound to capture groups.
    pub data_template: Option<String>,

    /// Module names, in composition order.
    pub modules: Vec<String>,

    pub template: Option<String>,

    pub styles: Vec<String>,

    pub title: Option<String>,

    /// Extra element classes. Entries may hold several space-separated names.
    pub custom_css_classes: Vec<String>,

    pub request_options: Map<String, Value>,

    /// Anything else is passed through to the page factory.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RouteDefinition {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            ..Default::default()
        }
    }

    pub fn script(mut self, script_id: impl Into<String>) -> Self {
        self.script_id = Some(script_id.into());
        self
    }

    pub fn data_template(mut self, template: impl Into<String>) -> Self {
        self.data_template = Some(template.into());
        self
    }

    pub fn modules<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.modules = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn custom_class(mut self, classes: impl Into<String>) -> Self {
        self.custom_css_classes.push(classes.into());
        self
    }

    pub fn request_option(mut self, key: impl Into<String>, value: Value) -> Self {
        self.request_options.insert(key.into(), value);
        self
    }

    pub fn extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Custom classes split on whitespace.
    pub fn css_classes(&self) -> impl Iterator<Item = &str> {
        self.custom_css_classes
            .iter()
            .flat_map(|entry| entry.split_whitespace())
    }
}

/// A module that pages compose.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ModuleDefinition {
    pub script_id: Option<String>,

    /// Shared across pages as a singleton.
    pub global: bool,

    /// Named mount point. Global modules only.
    pub el: Option<String>,

    /// Flattened into the module's construction options.
    pub options: Map<String, Value>,

    pub request_options: Map<String, Value>,

    pub template: Option<String>,
}

impl ModuleDefinition {
    pub fn new(script_id: impl Into<String>) -> Self {
        Self {
            script_id: Some(script_id.into()),
            ..Default::default()
        }
    }

    pub fn global(mut self) -> Self {
        self.global = true;
        self
    }

    pub fn mount_at(mut self, name: impl Into<String>) -> Self {
        self.el = Some(name.into());
        self
    }

    pub fn option(mut self, key: impl Into<String>, value: Value) -> Self {
        self.options.insert(key.into(), value);
        self
    }

    pub fn request_option(mut self, key: impl Into<String>, value: Value) -> Self {
        self.request_options.insert(key.into(), value);
        self
    }
}

/// Display settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct DisplayConfig {
    /// Pause between composition and `show()`.
    pub show_delay_ms: u64,

    /// Class every page element receives.
    pub page_class: String,

    pub active_class: String,
    pub loaded_class: String,
    pub disabled_class: String,
    pub error_class: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_delay_ms: 5,
            page_class: "page".to_string(),
            active_class: "page-active".to_string(),
            loaded_class: "page-loaded".to_string(),
            disabled_class: "page-disabled".to_string(),
            error_class: "page-error".to_string(),
        }
    }
}

/// Observability settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
