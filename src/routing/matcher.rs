//! Route matching logic.
//!
//! # Responsibilities
//! - Normalize navigation paths into route keys
//! - Test a compiled pattern against a key
//! - Expand `$N` placeholders from capture groups
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - Patterns use `regex` syntax: no lookaround and no backreferences.
//!   Such patterns fail at config load, not at navigation time
//! - Placeholders follow `String.prototype.replace` rules: `$NN` is
//!   preferred when that group exists, `$$` is a literal dollar

use std::sync::Arc;

use regex::Regex;

use crate::config::schema::RouteDefinition;

/// Strip a single leading slash and anything from `?` on.
pub fn normalize_path(path: &str) -> &str {
    let path = path.strip_prefix('/').unwrap_or(path);
    match path.find('?') {
        Some(idx) => &path[..idx],
        None => path,
    }
}

/// A route definition with its pattern compiled.
#[derive(Debug, Clone)]
pub struct CompiledRoute {
    regex: Regex,
    definition: Arc<RouteDefinition>,
}

impl CompiledRoute {
    pub fn compile(definition: RouteDefinition) -> Result<Self, regex::Error> {
        let regex = Regex::new(&definition.pattern)?;
        Ok(Self {
            regex,
            definition: Arc::new(definition),
        })
    }

    pub fn definition(&self) -> &Arc<RouteDefinition> {
        &self.definition
    }

    /// Capture groups of the first match in `key`; index 0 is the whole match.
    pub fn captures(&self, key: &str) -> Option<Vec<Option<String>>> {
        self.regex.captures(key).map(|caps| {
            caps.iter()
                .map(|group| group.map(|m| m.as_str().to_string()))
                .collect()
        })
    }
}

/// Substitute `$N` placeholders with capture groups.
///
/// `captures[0]` is the whole match. Groups that did not participate
/// expand to the empty string; references to groups that do not exist
/// are left as written.
pub fn expand_template(template: &str, captures: &[Option<String>]) -> String {
    let groups = captures.len().saturating_sub(1);
    let bytes = template.as_bytes();
    let mut out = String::with_capacity(template.len());
    let mut i = 0;
    let mut literal_start = 0;

    while i < bytes.len() {
        if bytes[i] != b'$' || i + 1 >= bytes.len() {
            i += 1;
            continue;
        }

        let next = bytes[i + 1];
        if next == b'$' {
            out.push_str(&template[literal_start..i]);
            out.push('$');
            i += 2;
            literal_start = i;
            continue;
        }
        if !next.is_ascii_digit() {
            i += 1;
            continue;
        }

        let one = usize::from(next - b'0');
        let two = bytes
            .get(i + 2)
            .filter(|b| b.is_ascii_digit())
            .map(|b| one * 10 + usize::from(b - b'0'));

        let (index, width) = match two {
            Some(n) if (1..=groups).contains(&n) => (n, 3),
            _ if (1..=groups).contains(&one) => (one, 2),
            _ => {
                i += 1;
                continue;
            }
        };

        out.push_str(&template[literal_start..i]);
        if let Some(Some(value)) = captures.get(index) {
            out.push_str(value);
        }
        i += width;
        literal_start = i;
    }

    out.push_str(&template[literal_start..]);
    out
}
