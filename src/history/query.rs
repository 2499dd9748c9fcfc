//! Query string parsing.

use std::collections::HashMap;

use url::Url;

const FALLBACK_BASE: &str = "http://localhost/";

/// Parse the query parameters of `url`.
///
/// Relative URLs are resolved against `base` (normally the current href).
/// Repeated keys keep the last value. An unparseable URL yields no params.
pub fn parse_query(url: &str, base: &str) -> HashMap<String, String> {
    let parsed = Url::parse(url).or_else(|_| {
        let base = Url::parse(base).or_else(|_| Url::parse(FALLBACK_BASE))?;
        base.join(url)
    });

    match parsed {
        Ok(parsed) => parsed
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect(),
        Err(e) => {
            tracing::debug!(url = %url, error = %e, "Could not parse URL for query params");
            HashMap::new()
        }
    }
}
