//! Construction options handed to page and module factories.

use serde::Serialize;
use serde_json::{Map, Value};

/// CSS class names a page toggles through its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageClasses {
    pub active_class: String,
    pub loaded_class: String,
    pub disabled_class: String,
    pub error_class: String,
}

/// Options passed as the second argument of a factory.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ViewOptions {
    /// Navigation data, or the route's data template after substitution.
    /// Also the page's load signature.
    pub data: Option<Value>,

    /// Router, page and module request options, later levels winning.
    pub request_options: Map<String, Value>,

    pub template: Option<String>,

    pub styles: Vec<String>,

    pub title: Option<String>,

    /// Present for pages only.
    #[serde(flatten)]
    pub classes: Option<PageClasses>,

    /// Pass-through options (page extras, module `options`).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ViewOptions {
    /// Look up a pass-through option.
    pub fn extra(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}

/// Shallow merge: keys from later layers replace earlier ones.
pub fn merge_request_options<'a, I>(layers: I) -> Map<String, Value>
where
    I: IntoIterator<Item = &'a Map<String, Value>>,
{
    let mut merged = Map::new();
    for layer in layers {
        for (key, value) in layer {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}
