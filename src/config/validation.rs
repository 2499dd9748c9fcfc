//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (pages reference declared modules)
//! - Reject patterns that do not compile
//! - Detect duplicate routes
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: NavigatorConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;

use regex::Regex;
use thiserror::Error;

use crate::config::schema::NavigatorConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("page #{index} has an empty pattern")]
    EmptyPattern { index: usize },

    #[error("pattern '{0}' is declared more than once")]
    DuplicatePattern(String),

    #[error("pattern '{pattern}' does not compile: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("page '{page}' references unknown module '{module}'")]
    UnknownModule { page: String, module: String },

    #[error("module '{0}' has a mount point but is not global")]
    MountPointOnPageModule(String),
}

/// Validate a configuration, collecting every problem.
pub fn validate_config(config: &NavigatorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for (index, page) in config.pages.iter().enumerate() {
        if page.pattern.is_empty() {
            errors.push(ValidationError::EmptyPattern { index });
            continue;
        }

        if !seen.insert(page.pattern.as_str()) {
            errors.push(ValidationError::DuplicatePattern(page.pattern.clone()));
        }

        if let Err(e) = Regex::new(&page.pattern) {
            errors.push(ValidationError::InvalidPattern {
                pattern: page.pattern.clone(),
                reason: e.to_string(),
            });
        }

        for module in &page.modules {
            if !config.modules.contains_key(module) {
                errors.push(ValidationError::UnknownModule {
                    page: page.pattern.clone(),
                    module: module.clone(),
                });
            }
        }
    }

    for (name, module) in &config.modules {
        if module.el.is_some() && !module.global {
            errors.push(ValidationError::MountPointOnPageModule(name.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
