//! Page navigator CLI.
//!
//! Validates navigator configs and dry-runs route resolution and
//! navigation against them.
//!
//! ```text
//! navigator --config site.toml check
//! navigator --config site.toml resolve /profile/32
//! navigator --config site.toml navigate home profile/32 about
//! navigator query "http://host/page?a=1"
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use page_navigator::config::{load_config, NavigatorConfig};
use page_navigator::dom::Element;
use page_navigator::history::{Document, HistoryAdapter, MemoryBrowser};
use page_navigator::navigator::{NavigateOptions, Navigator};
use page_navigator::observability::logging;
use page_navigator::routing::RouteTable;
use page_navigator::view::{PlainView, Resolved, ScriptResolver, View, ViewOptions};

#[derive(Parser)]
#[command(name = "navigator")]
#[command(about = "Inspect and dry-run page navigator configurations", long_about = None)]
struct Cli {
    /// Navigator config file (TOML).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level when RUST_LOG is unset. Defaults to the config's level.
    #[arg(short, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the config
    Check,
    /// Show which route a path resolves to
    Resolve { path: String },
    /// Navigate through paths with placeholder pages and report the result
    Navigate { paths: Vec<String> },
    /// Print the query parameters of a URL
    Query { url: String },
}

/// Resolves every script id to a plain view.
struct PlaceholderScripts;

impl ScriptResolver for PlaceholderScripts {
    fn resolve(&self, _script_id: &str) -> Option<Resolved> {
        Some(Resolved::Factory(Arc::new(|el: Element, _options: ViewOptions| {
            Ok(Arc::new(PlainView::new(el)) as Arc<dyn View>)
        })))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => NavigatorConfig::default(),
    };
    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| config.observability.log_level.clone());
    logging::init(&level);

    match cli.command {
        Commands::Check => {
            let routes = RouteTable::compile(&config.pages)?;
            println!(
                "ok: {} page routes, {} modules",
                routes.len(),
                config.modules.len()
            );
        }
        Commands::Resolve { path } => {
            let routes = RouteTable::compile(&config.pages)?;
            let report = match routes.resolve(&path) {
                Some(matched) => json!({
                    "path": path,
                    "key": matched.key,
                    "pattern": matched.definition.pattern,
                    "script_id": matched.definition.script_id,
                    "captures": matched.captures,
                    "data": matched.data_url(),
                    "modules": matched.definition.modules,
                    "title": matched.definition.title,
                }),
                None => json!({ "path": path, "matched": false }),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Navigate { paths } => {
            let report = navigate(config, &paths).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Query { url } => {
            let navigator = Navigator::builder(config).build()?;
            let params = navigator.get_query_params(Some(&url));
            println!("{}", serde_json::to_string_pretty(&params)?);
        }
    }

    Ok(())
}

async fn navigate(config: NavigatorConfig, paths: &[String]) -> Result<Value, Box<dyn std::error::Error>> {
    let browser = Arc::new(MemoryBrowser::new().with_title("navigator"));
    let errors = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let sink = errors.clone();

    let navigator = Navigator::builder(config)
        .browser(browser.clone())
        .resolver(PlaceholderScripts)
        .on_route_error(move |_, err| sink.lock().push(err.to_string()))
        .build()?;
    navigator.start()?;

    let mut steps = Vec::new();
    for path in paths {
        navigator.trigger_route(path, NavigateOptions::default()).await;
        steps.push(json!({
            "path": path,
            "active_page": navigator.active_page(),
            "relative_url": navigator.get_relative_url(),
            "title": browser.title(),
        }));
    }
    navigator.stop();

    let history: Vec<Value> = browser
        .entries()
        .into_iter()
        .map(|entry| json!({ "kind": format!("{:?}", entry.kind), "url": entry.url }))
        .collect();

    Ok(json!({
        "steps": steps,
        "history": history,
        "location": browser.location().href,
        "cached_pages": navigator.pages().keys(),
        "global_modules": navigator.global_modules().names(),
        "errors": errors.lock().clone(),
    }))
}
