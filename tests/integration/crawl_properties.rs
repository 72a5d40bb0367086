//! Crawl loop guarantees, checked against a scripted renderer
//!
//! These run on paused tokio time so retry delays and script sleeps finish
//! instantly.

use crate::support::{config, Page, ScriptedRenderer};
use std::time::Duration;
use tokio::time::Instant;
use trawl::crawler::{crawl, Coordinator};
use trawl::input::Seed;
use trawl::output::CrawlStats;
use trawl::storage::{RecordStore, RunStatus, SqliteRecordStore};
use trawl::{ActionScript, CrawlResult, StopReason};

fn store() -> SqliteRecordStore {
    SqliteRecordStore::new_in_memory().unwrap()
}

fn seeds(urls: &[&str]) -> Vec<Seed> {
    urls.iter().map(|u| Seed::new(*u)).collect()
}

fn record_urls(records: &[CrawlResult]) -> Vec<&str> {
    records.iter().map(|r| r.url()).collect()
}

/// A small site with a cycle, a dead link and a chain deeper than two hops
fn site() -> ScriptedRenderer {
    ScriptedRenderer::new()
        .page(
            "https://site.test/",
            Page::new("home").links(&["/a", "/b", "/dead", "https://site.test/#top"]),
        )
        .page("https://site.test/a", Page::new("a").links(&["/", "/b", "/a/deep"]))
        .page("https://site.test/b", Page::new("b").links(&["/a"]))
        .page("https://site.test/a/deep", Page::new("deep").links(&["/a/deeper"]))
        .page("https://site.test/a/deeper", Page::new("deeper"))
}

#[tokio::test(start_paused = true)]
async fn test_counts_balance_when_frontier_is_exhausted() {
    let config = config("max-depth = 3\nmax-retries = 1", "enabled = true");
    let mut coordinator = Coordinator::new(&config, site(), store());
    coordinator.seed(seeds(&["https://site.test/"]));

    let outcome = coordinator.run().await.unwrap();

    assert_eq!(outcome.stop_reason, StopReason::FrontierExhausted);
    assert!(outcome.stats.is_balanced(), "{}", outcome.stats);
    assert_eq!(outcome.stats.count_error, 1);

    let records = coordinator.store().records_for_run(outcome.run_id).unwrap();
    assert_eq!(records.len() as u64, outcome.stats.count_input);
    assert_eq!(
        records.iter().filter(|r| r.is_success()).count() as u64,
        outcome.stats.count_output
    );
}

#[tokio::test(start_paused = true)]
async fn test_depth_never_exceeds_max_depth() {
    let config = config("max-depth = 2", "enabled = true");
    let mut coordinator = Coordinator::new(&config, site(), store());
    coordinator.seed(seeds(&["https://site.test/"]));

    coordinator.run().await.unwrap();

    let visited = coordinator.renderer().navigations();
    // depth 0: /, depth 1: /a /b /dead, depth 2: /a/deep
    assert!(visited.contains(&"https://site.test/a/deep".to_string()));
    assert!(!visited.contains(&"https://site.test/a/deeper".to_string()));
}

#[tokio::test(start_paused = true)]
async fn test_each_url_is_rendered_once_with_dedup() {
    let config = config("max-depth = 5", "enabled = true");
    let mut coordinator = Coordinator::new(&config, site(), store());
    coordinator.seed(seeds(&["https://site.test/", "https://site.test/a"]));

    coordinator.run().await.unwrap();

    let renderer = coordinator.renderer();
    for url in renderer.navigations() {
        assert_eq!(renderer.navigation_count(&url), 1, "{} rendered twice", url);
    }
}

#[tokio::test(start_paused = true)]
async fn test_bloom_filter_dedups_the_same_site() {
    let config = config(
        "max-depth = 5",
        "enabled = true\nkind = \"bloom\"\nexpected-items = 1000\nfalse-positive-rate = 0.001",
    );
    let mut coordinator = Coordinator::new(&config, site(), store());
    coordinator.seed(seeds(&["https://site.test/"]));

    let outcome = coordinator.run().await.unwrap();

    assert_eq!(outcome.stats.count_input, 6);
    assert_eq!(coordinator.renderer().navigations().len(), 6);
}

#[tokio::test(start_paused = true)]
async fn test_revisits_without_dedup() {
    let renderer = ScriptedRenderer::new()
        .page("https://a.test/", Page::new("a").links(&["/b"]))
        .page("https://a.test/b", Page::new("b").links(&["/"]));
    let config = config("max-depth = 2", "enabled = false");
    let mut coordinator = Coordinator::new(&config, renderer, store());
    coordinator.seed(seeds(&["https://a.test/"]));

    coordinator.run().await.unwrap();

    assert_eq!(coordinator.renderer().navigation_count("https://a.test/"), 2);
}

#[tokio::test(start_paused = true)]
async fn test_already_visited_link_is_skipped() {
    let mut earlier = store();
    let run_id = earlier.begin_run("previous").unwrap();
    earlier
        .append(run_id, &CrawlResult::success("https://a.test/b", "b".into(), None))
        .unwrap();

    let renderer = ScriptedRenderer::new()
        .page("https://a.test/", Page::new("A").links(&["/b", "/c"]))
        .page("https://a.test/b", Page::new("B"))
        .page("https://a.test/c", Page::new("C"));
    let config = config("max-depth = 1", "enabled = true\nseed-from-store = true");

    let mut coordinator = Coordinator::new(&config, renderer, earlier);
    coordinator.preload_visited().unwrap();
    coordinator.seed(seeds(&["https://a.test/"]));
    let outcome = coordinator.run().await.unwrap();

    let records = coordinator.store().records_for_run(outcome.run_id).unwrap();
    assert_eq!(record_urls(&records), vec!["https://a.test/", "https://a.test/c"]);
    assert_eq!(coordinator.renderer().navigation_count("https://a.test/b"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_load_actions_run_in_order_for_matching_urls() {
    let renderer = ScriptedRenderer::new()
        .page("https://example.com/", Page::new("e").element("#more"))
        .page("https://other.org/", Page::new("o").element("#more"));
    let script = ActionScript::parse("[example\\.com]\nSLEEP 1\nCLICK #more\n").unwrap();
    let config = config("", "");

    let mut coordinator = Coordinator::new(&config, renderer, store()).with_load_actions(script);
    coordinator.seed(seeds(&["https://example.com/"]));
    let start = Instant::now();
    coordinator.run().await.unwrap();

    assert!(start.elapsed() >= Duration::from_secs(1));
    assert_eq!(
        coordinator.renderer().log,
        vec!["navigate https://example.com/", "click #more"]
    );

    let renderer = ScriptedRenderer::new().page("https://other.org/", Page::new("o"));
    let script = ActionScript::parse("[example\\.com]\nSLEEP 1\nCLICK #more\n").unwrap();
    let mut coordinator = Coordinator::new(&config, renderer, store()).with_load_actions(script);
    coordinator.seed(seeds(&["https://other.org/"]));
    coordinator.run().await.unwrap();

    assert_eq!(coordinator.renderer().log, vec!["navigate https://other.org/"]);
}

#[tokio::test(start_paused = true)]
async fn test_always_failing_url_is_attempted_max_retries_plus_one_times() {
    let renderer = ScriptedRenderer::new().broken("https://down.test/");
    let config = config("max-retries = 2", "");
    let mut coordinator = Coordinator::new(&config, renderer, store());
    coordinator.seed(seeds(&["https://down.test/"]));

    let outcome = coordinator.run().await.unwrap();

    assert_eq!(coordinator.renderer().navigation_count("https://down.test/"), 3);
    assert_eq!(
        outcome.stats,
        CrawlStats {
            count_input: 1,
            count_output: 0,
            count_error: 1
        }
    );

    let records = coordinator.store().records_for_run(outcome.run_id).unwrap();
    assert_eq!(records.len(), 1);
    assert!(records[0].error().unwrap().contains("connection refused"));
}

#[tokio::test(start_paused = true)]
async fn test_missing_click_target_fails_after_retries() {
    let renderer = ScriptedRenderer::new().page("https://a.test/", Page::new("a"));
    let script = ActionScript::parse("[a\\.test]\nCLICK #gone\n").unwrap();
    let config = config("max-retries = 1", "");
    let mut coordinator = Coordinator::new(&config, renderer, store()).with_load_actions(script);
    coordinator.seed(seeds(&["https://a.test/"]));

    let outcome = coordinator.run().await.unwrap();

    assert_eq!(coordinator.renderer().navigation_count("https://a.test/"), 2);
    assert_eq!(outcome.stats.count_error, 1);
    let records = coordinator.store().records_for_run(outcome.run_id).unwrap();
    assert!(records[0].error().unwrap().contains("CLICK #gone"));
}

#[tokio::test(start_paused = true)]
async fn test_error_ceiling_stops_before_next_seed() {
    let renderer = ScriptedRenderer::new()
        .broken("https://one.test/")
        .broken("https://two.test/");
    let config = config("max-errors = 1", "");
    let mut coordinator = Coordinator::new(&config, renderer, store());
    coordinator.seed(seeds(&["https://one.test/", "https://two.test/"]));

    let outcome = coordinator.run().await.unwrap();

    assert_eq!(outcome.stop_reason, StopReason::ErrorCeiling);
    assert_eq!(outcome.stats.count_output, 0);
    assert_eq!(outcome.stats.count_error, 1);
    assert_eq!(coordinator.renderer().navigation_count("https://two.test/"), 0);

    let run = coordinator.store().get_run(outcome.run_id).unwrap();
    assert_eq!(run.status, RunStatus::Stopped);
}

#[tokio::test(start_paused = true)]
async fn test_crawl_entry_point_reports_outcome() {
    let config = config("max-depth = 1", "enabled = true");
    let outcome = crawl(
        &config,
        "hash",
        seeds(&["https://site.test/", "not a url"]),
        site(),
        store(),
    )
    .await
    .unwrap();

    assert_eq!(outcome.dropped_seeds, 1);
    assert_eq!(
        outcome.stats,
        CrawlStats {
            count_input: 4,
            count_output: 3,
            count_error: 1
        }
    );
}
