//! Metrics collection.
//!
//! # Metrics
//! - `navigator_navigations_total` (counter): navigations by outcome
//! - `navigator_page_loads_total` (counter): page loads by outcome
//! - `navigator_module_failures_total` (counter): module load failures by module
//! - `navigator_cache_entries` (gauge): cached pages / global modules
//!
//! # Design Decisions
//! - Labels are low-cardinality (outcome, cache name, module name)
//! - No exporter here; the embedding application installs a recorder

use metrics::{counter, gauge};

pub fn record_navigation(outcome: &'static str) {
    counter!("navigator_navigations_total", "outcome" => outcome).increment(1);
}

pub fn record_page_load(success: bool) {
    let outcome = if success { "loaded" } else { "failed" };
    counter!("navigator_page_loads_total", "outcome" => outcome).increment(1);
}

pub fn record_module_failure(module: &str) {
    counter!("navigator_module_failures_total", "module" => module.to_string()).increment(1);
}

pub fn record_cache_size(cache: &'static str, entries: usize) {
    gauge!("navigator_cache_entries", "cache" => cache).set(entries as f64);
}
