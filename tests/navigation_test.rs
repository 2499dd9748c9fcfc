//! Navigation flow tests.
//!
//! Drive a started navigator over an in-memory browser and check what
//! ends up loaded, visible and recorded in history.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use serde_json::json;
use tokio::sync::Notify;

use common::{register, register_fresh, wait_until, Harness, MockView};
use page_navigator::config::{NavigatorConfig, RouteDefinition};
use page_navigator::history::{Document, HistoryKind, HistoryState, MemoryBrowser};
use page_navigator::navigator::RegisterOptions;
use page_navigator::view::ScriptRegistry;
use page_navigator::{LoadOutcome, NavigateOptions, NavigationError, Navigator, View, ViewError};

fn two_pages() -> (NavigatorConfig, ScriptRegistry, Arc<MockView>, Arc<MockView>) {
    let scripts = ScriptRegistry::new();
    let a = MockView::new("a");
    let b = MockView::new("b");
    register(&scripts, "pages/a", &a);
    register(&scripts, "pages/b", &b);
    let config = NavigatorConfig::default()
        .page(RouteDefinition::new("^a$").script("pages/a"))
        .page(RouteDefinition::new("^b$").script("pages/b"));
    (config, scripts, a, b)
}

#[tokio::test]
async fn test_first_declared_route_wins() {
    let scripts = ScriptRegistry::new();
    let home = MockView::new("home");
    let prefix = MockView::new("prefix");
    register(&scripts, "pages/home", &home);
    register(&scripts, "pages/prefix", &prefix);
    let config = NavigatorConfig::default()
        .page(RouteDefinition::new("^home$").script("pages/home"))
        .page(RouteDefinition::new("^ho").script("pages/prefix"));
    let h = Harness::new(config, &scripts);

    h.go("home").await;

    assert_eq!(home.loads(), 1);
    assert_eq!(prefix.loads(), 0);
    assert_eq!(h.navigator.active_page().as_deref(), Some("home"));
    assert!(h.errors().is_empty());
}

#[tokio::test]
async fn test_data_template_builds_one_page_per_path() {
    let scripts = ScriptRegistry::new();
    let built = register_fresh(&scripts, "pages/profile");
    let config = NavigatorConfig::default().page(
        RouteDefinition::new(r"^profile/(\d+)$")
            .script("pages/profile")
            .data_template("/api/profile/$1"),
    );
    let h = Harness::new(config, &scripts);

    h.go("profile/33").await;
    h.go("/profile/44").await;

    let built = built.lock().clone();
    assert_eq!(built.len(), 2);
    assert_eq!(built[0].last_options().unwrap().data, Some(json!("/api/profile/33")));
    assert_eq!(built[1].last_options().unwrap().data, Some(json!("/api/profile/44")));
    assert_eq!(h.navigator.pages().len(), 2);
    assert_eq!(built[0].hides(), 1);

    let definition = h.navigator.page_config_by_path("/profile/7?tab=posts").unwrap();
    assert_eq!(definition.pattern, r"^profile/(\d+)$");
}

#[tokio::test]
async fn test_leading_slash_and_query_share_cache_entry() {
    let (config, scripts, a, _b) = two_pages();
    let h = Harness::new(config, &scripts);

    h.go("/a?ref=mail").await;
    h.go("a").await;

    assert_eq!(a.loads(), 1);
    assert_eq!(a.hides(), 0);
    assert_eq!(h.navigator.active_page().as_deref(), Some("a"));
}

#[tokio::test]
async fn test_changed_data_rebuilds_page() {
    let scripts = ScriptRegistry::new();
    let built = register_fresh(&scripts, "pages/item");
    let config = NavigatorConfig::default().page(RouteDefinition::new("^item$").script("pages/item"));
    let h = Harness::new(config, &scripts);

    let first = NavigateOptions::default().with_data(json!({"id": 1}));
    let second = NavigateOptions::default().with_data(json!({"id": 2}));
    h.navigator.trigger_route("item", first).await;
    h.navigator.trigger_route("item", second.clone()).await;
    h.navigator.trigger_route("item", second).await;

    let built = built.lock().clone();
    assert_eq!(built.len(), 2);
    assert_eq!(built[0].destroys(), 1);
    assert_eq!(built[1].loads(), 1);
    assert_eq!(built[1].last_options().unwrap().data, Some(json!({"id": 2})));
    assert!(h.container.contains(&built[1].el));
    assert!(!h.container.contains(&built[0].el));
}

/// Route `item` whose factory hands out `first`, then `second` on every
/// later call. Without `second`, later calls fail to construct.
fn replaceable_item(first: &Arc<MockView>, second: Option<Arc<MockView>>) -> (NavigatorConfig, ScriptRegistry) {
    let scripts = ScriptRegistry::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let first = first.clone();
    scripts.register_factory("pages/item", move |_el, _options| {
        if calls.fetch_add(1, Ordering::SeqCst) == 0 {
            return Ok(first.clone() as Arc<dyn View>);
        }
        match &second {
            Some(view) => Ok(view.clone() as Arc<dyn View>),
            None => Err(ViewError::new("item script threw")),
        }
    });
    let config = NavigatorConfig::default().page(RouteDefinition::new("^item$").script("pages/item"));
    (config, scripts)
}

#[tokio::test]
async fn test_failed_rebuild_keeps_visible_page() {
    let current = MockView::new("current");
    let (config, scripts) = replaceable_item(&current, None);
    let h = Harness::new(config, &scripts);
    h.go("item").await;

    let outcome = h
        .navigator
        .load_page("item", &NavigateOptions::default().with_data(json!({"x": 1})))
        .await;

    assert_eq!(outcome, LoadOutcome::Failed);
    assert_eq!(h.errors().len(), 1);
    assert_eq!(current.destroys(), 0);
    assert_eq!(current.shows(), 2);
    assert_eq!(h.navigator.active_page().as_deref(), Some("item"));
    assert_eq!(h.container.children(), vec![current.el.clone()]);
    assert!(h.navigator.pages().get("item").unwrap().signature().is_none());
}

#[tokio::test]
async fn test_failed_reload_keeps_visible_page_then_retries() {
    let current = MockView::new("current");
    let replacement = MockView::new("replacement");
    replacement.set_fail_load(true);
    let (config, scripts) = replaceable_item(&current, Some(replacement.clone()));
    let h = Harness::new(config, &scripts);
    h.go("item").await;

    let changed = NavigateOptions::default().with_data(json!({"x": 1}));
    h.navigator.trigger_route("item", changed.clone()).await;

    assert_eq!(h.errors().len(), 1);
    assert_eq!(current.destroys(), 0);
    assert_eq!(current.shows(), 2);
    assert_eq!(replacement.shows(), 0);
    assert_eq!(h.navigator.active_page().as_deref(), Some("item"));
    assert_eq!(h.container.children(), vec![current.el.clone()]);

    replacement.set_fail_load(false);
    h.navigator.trigger_route("item", changed).await;

    assert_eq!(replacement.loads(), 2);
    assert_eq!(replacement.shows(), 1);
    assert_eq!(current.destroys(), 1);
    assert_eq!(h.container.children(), vec![replacement.el.clone()]);
    assert_eq!(
        h.navigator.pages().get("item").unwrap().signature(),
        Some(&json!({"x": 1}))
    );
}

#[tokio::test]
async fn test_previous_page_hidden_and_detached() {
    let (config, scripts, a, b) = two_pages();
    let h = Harness::new(config, &scripts);

    h.go("a").await;
    h.go("b").await;

    assert_eq!(a.hides(), 1);
    assert_eq!(b.shows(), 1);
    assert!(!h.container.contains(&a.el));
    assert!(h.container.contains(&b.el));

    h.go("a").await;
    assert_eq!(a.loads(), 1);
    assert_eq!(a.shows(), 2);
    assert_eq!(b.hides(), 1);
    assert_eq!(h.container.children(), vec![a.el.clone()]);
}

#[tokio::test]
async fn test_failed_page_reports_and_restores_previous() {
    let (config, scripts, a, b) = two_pages();
    let h = Harness::new(config, &scripts);
    b.set_fail_load(true);

    h.go("a").await;
    let outcome = h.navigator.load_page("b", &NavigateOptions::default()).await;

    assert_eq!(outcome, LoadOutcome::Failed);
    let errors = h.errors();
    assert_eq!(errors.len(), 1);
    assert!(matches!(&errors[0], NavigationError::PageLoad { path, .. } if path == "b"));
    assert_eq!(a.shows(), 2);
    assert_eq!(h.navigator.active_page().as_deref(), Some("a"));
    assert!(h.container.contains(&a.el));
    assert!(!h.container.contains(&b.el));
    assert!(!h.navigator.pages().contains("b"));

    b.set_fail_load(false);
    let outcome = h.navigator.load_page("b", &NavigateOptions::default()).await;
    assert_eq!(outcome, LoadOutcome::Loaded);
    assert_eq!(b.loads(), 2);
    assert_eq!(h.navigator.active_page().as_deref(), Some("b"));
}

#[tokio::test]
async fn test_unresolvable_script_is_a_page_error() {
    let scripts = ScriptRegistry::new();
    let config = NavigatorConfig::default().page(RouteDefinition::new("^broken$").script("pages/missing"));
    let h = Harness::new(config, &scripts);

    h.go("broken").await;

    let errors = h.errors();
    assert_eq!(errors.len(), 1);
    assert!(matches!(&errors[0], NavigationError::PageLoad { source, .. } if source.message().contains("pages/missing")));
    assert!(h.navigator.active_page().is_none());
    assert!(h.page_loads.lock().is_empty());
}

#[tokio::test]
async fn test_unknown_route_still_registers_url() {
    let h = Harness::new(NavigatorConfig::default(), &ScriptRegistry::new());

    h.go("my/url").await;

    assert_eq!(h.errors(), vec![NavigationError::RouteNotFound("my/url".into())]);
    assert_eq!(h.navigator.get_relative_url(), "my/url");
    assert_eq!(h.navigator.get_relative_url_params(), vec!["my", "url"]);
    let entries = h.browser.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].url, "my/url");
    assert_eq!(*h.route_changes.lock(), vec!["my/url".to_string()]);
    assert!(h.page_loads.lock().is_empty());
    assert!(h.navigator.active_page().is_none());
}

#[tokio::test]
async fn test_silent_unknown_route_leaves_history_alone() {
    let (config, scripts, _a, _b) = two_pages();
    let h = Harness::new(config, &scripts);
    h.go("a").await;

    h.navigator.trigger_route("nowhere", NavigateOptions::silent()).await;

    assert_eq!(h.browser.entries().len(), 1);
    assert_eq!(h.navigator.get_relative_url(), "a");
    assert_eq!(h.errors(), vec![NavigationError::RouteNotFound("nowhere".into())]);
}

#[tokio::test]
async fn test_hooks_fire_for_each_navigation() {
    let (config, scripts, a, b) = two_pages();
    let h = Harness::new(config, &scripts);

    h.go("a").await;
    h.go("b").await;

    assert_eq!(*h.route_changes.lock(), vec!["a".to_string(), "b".to_string()]);
    assert_eq!(*h.page_loads.lock(), vec!["a".to_string(), "b".to_string()]);
    assert_eq!(a.templates(), 0);
    assert_eq!(b.templates(), 0);
}

#[tokio::test]
async fn test_history_push_replace_and_silent() {
    let (config, scripts, _a, _b) = two_pages();
    let h = Harness::new(config, &scripts);

    h.go("a").await;
    h.navigator.trigger_route("b", NavigateOptions::replace()).await;
    h.navigator.trigger_route("a", NavigateOptions::silent()).await;

    let entries = h.browser.entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].kind, HistoryKind::Push);
    assert_eq!(entries[0].url, "a");
    assert_eq!(entries[1].kind, HistoryKind::Replace);
    assert_eq!(entries[1].state, HistoryState::for_path("b"));
    assert_eq!(h.navigator.active_page().as_deref(), Some("a"));
    assert_eq!(h.navigator.get_relative_url(), "b");
}

#[tokio::test]
async fn test_redirect_registers_original_then_target() {
    let scripts = ScriptRegistry::new();
    let old = MockView::new("old");
    let new = MockView::new("new");
    register(&scripts, "pages/old", &old);
    register(&scripts, "pages/new", &new);
    let config = NavigatorConfig::default()
        .page(RouteDefinition::new("^old$").script("pages/old"))
        .page(RouteDefinition::new("^new$").script("pages/new"));
    let h = Harness::with(config, &scripts, |builder| {
        builder.on_route_request(|_, path| {
            let target = (path == "old").then(|| "new".to_string());
            async move { target }.boxed()
        })
    });

    h.go("old").await;

    assert_eq!(old.loads(), 0);
    assert_eq!(new.loads(), 1);
    let urls: Vec<String> = h.browser.entries().into_iter().map(|e| e.url).collect();
    assert_eq!(urls, vec!["old".to_string(), "new".to_string()]);
    assert_eq!(h.navigator.active_page().as_deref(), Some("new"));
    assert_eq!(h.navigator.get_relative_url(), "new");
}

#[tokio::test]
async fn test_redirect_to_unknown_route_keeps_original_url() {
    let (config, scripts, a, _b) = two_pages();
    let h = Harness::with(config, &scripts, |builder| {
        builder.on_route_request(|_, path| {
            let target = (path == "a").then(|| "ghost".to_string());
            async move { target }.boxed()
        })
    });

    h.go("a").await;

    assert_eq!(a.loads(), 0);
    let urls: Vec<String> = h.browser.entries().into_iter().map(|e| e.url).collect();
    assert_eq!(urls, vec!["a".to_string()]);
    assert_eq!(h.navigator.get_relative_url(), "a");
    assert_eq!(h.errors(), vec![NavigationError::RouteNotFound("ghost".into())]);
}

#[tokio::test]
async fn test_title_prefers_instance_then_config_then_original() {
    let scripts = ScriptRegistry::new();
    let a = MockView::new("a");
    let b = MockView::new("b");
    let c = MockView::new("c");
    b.set_title("Inbox (3)");
    register(&scripts, "pages/a", &a);
    register(&scripts, "pages/b", &b);
    register(&scripts, "pages/c", &c);
    let config = NavigatorConfig::default()
        .page(RouteDefinition::new("^a$").script("pages/a").title("Page A"))
        .page(RouteDefinition::new("^b$").script("pages/b").title("Inbox"))
        .page(RouteDefinition::new("^c$").script("pages/c"));
    let h = Harness::new(config, &scripts);

    h.go("a").await;
    assert_eq!(h.browser.title(), "Page A");
    h.go("b").await;
    assert_eq!(h.browser.title(), "Inbox (3)");
    h.go("c").await;
    assert_eq!(h.browser.title(), "Original");
}

#[tokio::test]
async fn test_show_waits_for_display_delay() {
    let (config, scripts, a, _b) = two_pages();
    let h = Harness::new(config, &scripts);

    h.go("a").await;

    let gap = a.load_to_show().unwrap();
    assert!(gap >= Duration::from_millis(5), "shown {gap:?} after load");
}

#[tokio::test]
async fn test_page_classes_and_construction_options() {
    let scripts = ScriptRegistry::new();
    let a = MockView::new("a");
    register(&scripts, "pages/a", &a);
    let config = NavigatorConfig::default()
        .request_option("lang", json!("fr"))
        .request_option("token", json!("t"))
        .page(
            RouteDefinition::new("^a$")
                .script("pages/a")
                .custom_class("wide  dark")
                .title("A")
                .request_option("lang", json!("en"))
                .extra("layout", json!("grid")),
        );
    let h = Harness::new(config, &scripts);

    h.go("a").await;

    assert_eq!(a.el.classes(), vec!["page", "wide", "dark"]);
    let options = a.last_options().unwrap();
    assert_eq!(options.request_options.get("lang"), Some(&json!("en")));
    assert_eq!(options.request_options.get("token"), Some(&json!("t")));
    assert_eq!(options.title.as_deref(), Some("A"));
    assert_eq!(options.extra("layout"), Some(&json!("grid")));
    assert_eq!(options.classes.unwrap().active_class, "page-active");
    assert!(options.data.is_none());
}

#[tokio::test]
async fn test_page_without_script_is_plain() {
    let scripts = ScriptRegistry::new();
    let config = NavigatorConfig::default().page(RouteDefinition::new("^about$"));
    let h = Harness::new(config, &scripts);

    h.go("about").await;

    assert!(h.errors().is_empty());
    assert_eq!(h.navigator.active_page().as_deref(), Some("about"));
    let children = h.container.children();
    assert_eq!(children.len(), 1);
    assert!(children[0].has_class("page"));
}

#[tokio::test]
async fn test_back_navigates_without_writing_history() {
    let (config, scripts, a, _b) = two_pages();
    let h = Harness::new(config, &scripts);

    h.go("a").await;
    h.go("b").await;
    assert!(h.browser.back());

    let navigator = h.navigator.clone();
    assert!(wait_until(|| navigator.active_page().as_deref() == Some("a")).await);
    assert!(wait_until(|| a.shows() == 2).await);
    assert_eq!(h.browser.entries().len(), 1);
    assert_eq!(a.loads(), 1);
}

#[tokio::test]
async fn test_popstate_without_path_is_ignored() {
    let (config, scripts, _a, _b) = two_pages();
    let h = Harness::new(config, &scripts);
    h.go("a").await;

    h.browser.pop_state(None);
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert_eq!(h.route_changes.lock().len(), 1);
    assert_eq!(h.navigator.active_page().as_deref(), Some("a"));
}

#[tokio::test]
async fn test_superseded_navigation_leaves_view_alone() {
    let (config, scripts, a, b) = two_pages();
    let h = Harness::new(config, &scripts);
    let gate = Arc::new(Notify::new());
    a.gate_load(gate.clone());

    let navigator = h.navigator.clone();
    let slow = tokio::spawn(async move { navigator.load_page("a", &NavigateOptions::default()).await });
    assert!(wait_until(|| a.loads() == 1).await);

    h.go("b").await;
    gate.notify_one();
    let outcome = slow.await.unwrap();

    assert_eq!(outcome, LoadOutcome::Superseded);
    assert_eq!(a.shows(), 0);
    assert_eq!(b.shows(), 1);
    assert_eq!(h.navigator.active_page().as_deref(), Some("b"));
    assert!(h.container.contains(&b.el));
    assert!(!h.container.contains(&a.el));
    assert!(h.navigator.pages().get("a").unwrap().is_loaded());
}

#[tokio::test]
async fn test_show_and_hide_page_directly() {
    let (config, scripts, a, _b) = two_pages();
    let h = Harness::new(config, &scripts);
    h.go("a").await;

    h.navigator.hide_page("a").await.unwrap();
    assert_eq!(a.hides(), 1);
    assert!(!h.container.contains(&a.el));
    assert!(h.navigator.active_page().is_none());

    h.navigator.show_page("/a").await.unwrap();
    assert_eq!(a.shows(), 2);
    assert!(h.container.contains(&a.el));

    assert_eq!(
        h.navigator.show_page("zzz").await,
        Err(NavigationError::PageNotLoaded("zzz".into()))
    );
    assert_eq!(
        h.navigator.hide_page("zzz").await,
        Err(NavigationError::PageNotLoaded("zzz".into()))
    );
}

#[tokio::test]
async fn test_relative_url_and_query_params() {
    let browser = Arc::new(MemoryBrowser::with_url("http://localhost/app/list?x=1#/inbox/3"));
    let navigator = Navigator::builder(NavigatorConfig::default())
        .browser(browser)
        .build()
        .unwrap();

    assert_eq!(navigator.get_relative_url(), "inbox/3");
    assert_eq!(navigator.get_relative_url_params(), vec!["inbox", "3"]);
    assert_eq!(navigator.get_query_params(None).get("x").map(String::as_str), Some("1"));

    let params = navigator.get_query_params(Some("/search?q=rust&page=2"));
    assert_eq!(params.get("q").map(String::as_str), Some("rust"));
    assert_eq!(params.get("page").map(String::as_str), Some("2"));

    navigator.register_url("/inbox/4", RegisterOptions::default());
    assert_eq!(navigator.get_relative_url(), "inbox/4");
}

#[test]
fn test_relative_url_falls_back_to_pathname() {
    let browser = Arc::new(MemoryBrowser::with_url("http://localhost/app/list"));
    let navigator = Navigator::builder(NavigatorConfig::default())
        .browser(browser)
        .build()
        .unwrap();

    assert_eq!(navigator.get_relative_url(), "app/list");
    assert_eq!(navigator.get_relative_url_params(), vec!["app", "list"]);
}
