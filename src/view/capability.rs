//! The optional-capability trait implemented by pages and modules.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::dom::Element;

/// Failure reported by a page or module.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ViewError {
    message: String,
}

impl ViewError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A page or module instance.
///
/// Only `el()` is required. Missing capabilities fall back to the default
/// bodies below, which succeed without doing anything.
#[async_trait]
pub trait View: Send + Sync {
    /// The element owned by this instance.
    fn el(&self) -> Element;

    /// Document title to use while this instance is the visible page.
    fn title(&self) -> Option<String> {
        None
    }

    async fn load(&self) -> Result<(), ViewError> {
        Ok(())
    }

    /// Fetch the data the instance renders. Awaited before `show()`.
    async fn fetch_data(&self) -> Result<Value, ViewError> {
        Ok(Value::Null)
    }

    /// Markup for the instance's own rendering. The navigator never calls
    /// it; pages and modules use it from their own `load()` or `show()`.
    async fn template(&self) -> Result<Option<String>, ViewError> {
        Ok(None)
    }

    async fn show(&self) -> Result<(), ViewError> {
        Ok(())
    }

    async fn hide(&self) -> Result<(), ViewError> {
        Ok(())
    }

    /// Told about a failure of this instance's own load.
    async fn error(&self, _err: &ViewError) {}

    fn destroy(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Bare {
        el: Element,
    }

    impl View for Bare {
        fn el(&self) -> Element {
            self.el.clone()
        }
    }

    #[tokio::test]
    async fn test_default_capabilities_are_noops() {
        let view = Bare { el: Element::div() };
        assert!(view.load().await.is_ok());
        assert_eq!(view.fetch_data().await, Ok(Value::Null));
        assert_eq!(view.template().await, Ok(None));
        assert!(view.show().await.is_ok());
        assert!(view.hide().await.is_ok());
        view.error(&ViewError::new("ignored")).await;
        view.destroy();
        assert!(view.title().is_none());
    }

    #[test]
    fn test_error_display() {
        let err = ViewError::new("boom");
        assert_eq!(err.to_string(), "boom");
        assert_eq!(err.message(), "boom");
    }
}
