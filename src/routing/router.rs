//! Route lookup.
//!
//! # Responsibilities
//! - Store compiled routes in declaration order
//! - Resolve a path to its first matching route
//! - Return the match or an explicit None
//!
//! # Design Decisions
//! - Immutable after construction (shared without locks)
//! - O(n) pattern scan (acceptable for typical route counts)
//! - The cache key is the normalized path, so `profile/32` and
//!   `profile/44` are distinct pages of one route

use std::sync::Arc;

use crate::config::loader::ConfigError;
use crate::config::schema::RouteDefinition;
use crate::routing::matcher::{expand_template, normalize_path, CompiledRoute};

/// A successful resolution.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub definition: Arc<RouteDefinition>,
    /// Capture groups; index 0 is the whole match.
    pub captures: Vec<Option<String>>,
    /// Normalized path, used as the page cache key.
    pub key: String,
}

impl RouteMatch {
    /// The definition's data template with placeholders substituted.
    pub fn data_url(&self) -> Option<String> {
        self.definition
            .data_template
            .as_deref()
            .map(|template| expand_template(template, &self.captures))
    }
}

/// Ordered, compiled page routes.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<CompiledRoute>,
}

impl RouteTable {
    pub fn compile(definitions: &[RouteDefinition]) -> Result<Self, ConfigError> {
        let routes = definitions
            .iter()
            .map(|definition| {
                CompiledRoute::compile(definition.clone()).map_err(|source| ConfigError::Pattern {
                    pattern: definition.pattern.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(routes = routes.len(), "Route table compiled");
        Ok(Self { routes })
    }

    /// First route, in declaration order, whose pattern matches `path`.
    pub fn resolve(&self, path: &str) -> Option<RouteMatch> {
        let key = normalize_path(path);
        self.routes.iter().find_map(|route| {
            route.captures(key).map(|captures| RouteMatch {
                definition: route.definition().clone(),
                captures,
                key: key.to_string(),
            })
        })
    }

    pub fn definitions(&self) -> impl Iterator<Item = &Arc<RouteDefinition>> {
        self.routes.iter().map(CompiledRoute::definition)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(patterns: &[&str]) -> RouteTable {
        let defs: Vec<_> = patterns
            .iter()
            .map(|p| RouteDefinition::new(*p).title(*p))
            .collect();
        RouteTable::compile(&defs).unwrap()
    }

    #[test]
    fn test_first_declared_match_wins() {
        let table = table(&["^profile", "^profile/([0-9]+)$"]);
        let matched = table.resolve("profile/32").unwrap();
        assert_eq!(matched.definition.pattern, "^profile");

        let table = self::table(&["^profile/([0-9]+)$", "^profile"]);
        let matched = table.resolve("profile/32").unwrap();
        assert_eq!(matched.definition.pattern, "^profile/([0-9]+)$");
    }

    #[test]
    fn test_patterns_are_not_anchored() {
        let table = table(&["file"]);
        assert!(table.resolve("my/profile/page").is_some());
    }

    #[test]
    fn test_leading_slash_and_query_ignored() {
        let table = table(&["^profile/([0-9]+)$"]);
        let matched = table.resolve("/profile/32?tab=posts").unwrap();
        assert_eq!(matched.key, "profile/32");
        assert_eq!(matched.captures[1].as_deref(), Some("32"));
    }

    #[test]
    fn test_no_match() {
        let table = table(&["^home$"]);
        assert!(table.resolve("about").is_none());
        assert!(RouteTable::default().resolve("").is_none());
    }

    #[test]
    fn test_data_url() {
        let defs = vec![RouteDefinition::new("^profile/([0-9]+)$")
            .data_template("http://host/profile/$1")];
        let table = RouteTable::compile(&defs).unwrap();
        assert_eq!(
            table.resolve("profile/32").unwrap().data_url().as_deref(),
            Some("http://host/profile/32")
        );
        assert_eq!(
            table.resolve("profile/44").unwrap().data_url().as_deref(),
            Some("http://host/profile/44")
        );
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let err = RouteTable::compile(&[RouteDefinition::new("(")]).unwrap_err();
        assert!(matches!(err, ConfigError::Pattern { ref pattern, .. } if pattern == "("));
    }

    #[test]
    fn test_lookaround_pattern_rejected_at_compile() {
        let err = RouteTable::compile(&[RouteDefinition::new("^(?!admin).*$")]).unwrap_err();
        assert!(matches!(err, ConfigError::Pattern { ref pattern, .. } if pattern == "^(?!admin).*$"));

        let err = RouteTable::compile(&[RouteDefinition::new(r"^(a)\1$")]).unwrap_err();
        assert!(matches!(err, ConfigError::Pattern { .. }));
    }
}
