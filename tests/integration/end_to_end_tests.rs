//! Full crawl cycle: config file, seed file, scripts, HTTP pages and SQLite

use std::path::{Path, PathBuf};
use tempfile::TempDir;
use trawl::config::{compute_config_hash, load_config_with_hash};
use trawl::crawler::crawl;
use trawl::input::load_seeds;
use trawl::output::load_statistics;
use trawl::renderer::HttpRenderer;
use trawl::storage::{open_store, RecordStore, RunStatus};
use trawl::StopReason;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Workspace {
    dir: TempDir,
    config_path: PathBuf,
    db_path: PathBuf,
}

impl Workspace {
    /// Writes a config, seed file and scripts for a crawl of `base`
    fn new(base: &str, crawler: &str, dedup: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let seeds_path = dir.path().join("seeds.txt");
        let load_path = dir.path().join("load.actions");
        let crawl_path = dir.path().join("crawl.actions");
        let db_path = dir.path().join("crawl.db");
        let config_path = dir.path().join("trawl.toml");

        std::fs::write(&seeds_path, format!("{base}/\n\n{base}/broken\nnot a url\n")).unwrap();
        std::fs::write(&load_path, "[127\\.0\\.0\\.1]\nSCROLL 500\n").unwrap();
        std::fs::write(&crawl_path, "[.*]\nCLICK_IF_EXISTS .cookie-accept\n").unwrap();
        std::fs::write(
            &config_path,
            format!(
                r#"
[crawler]
sleep-success = 0.0
sleep-error = 0.0
{crawler}

[dedup]
{dedup}

[scripts]
load-actions = '{load}'
crawl-actions = '{crawl}'

[input]
path = '{seeds}'

[output]
database-path = '{db}'

[renderer]
user-agent = "trawl-e2e/1.0"
page-timeout = 5
"#,
                load = load_path.display(),
                crawl = crawl_path.display(),
                seeds = seeds_path.display(),
                db = db_path.display(),
            ),
        )
        .unwrap();

        Self {
            dir,
            config_path,
            db_path,
        }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }
}

fn page(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html")
}

async fn mock_site() -> MockServer {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(page(format!(
            r#"<html><body>
            <a href="{base}/page1">Page 1</a>
            <a href="/page2?utm_source=feed">Page 2</a>
            <a href="/page1#comments">Page 1 again</a>
            <a href="javascript:void(0)">JS</a>
            </body></html>"#
        )))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page1"))
        .respond_with(page(r#"<html><body><a href="/page3">3</a></body></html>"#.to_string()))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page2"))
        .respond_with(page("<html><body>two</body></html>".to_string()))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    server
}

async fn run_once(workspace: &Workspace) -> trawl::CrawlOutcome {
    let (config, hash) = load_config_with_hash(&workspace.config_path).unwrap();
    let seeds = load_seeds(&config.input.path, config.input.format).unwrap();
    let store = open_store(&workspace.db_path).unwrap();
    let renderer = HttpRenderer::new(&config.renderer).unwrap();

    crawl(&config, &hash, seeds, renderer, store).await.unwrap()
}

#[tokio::test]
async fn test_full_crawl_writes_records() {
    let server = mock_site().await;
    let base = server.uri();
    let workspace = Workspace::new(&base, "max-depth = 1\nmax-retries = 1", "enabled = true");

    let outcome = run_once(&workspace).await;

    assert_eq!(outcome.stop_reason, StopReason::FrontierExhausted);
    assert_eq!(outcome.dropped_seeds, 1);
    assert_eq!(outcome.stats.count_input, 4);
    assert_eq!(outcome.stats.count_output, 3);
    assert_eq!(outcome.stats.count_error, 1);

    let store = open_store(&workspace.db_path).unwrap();
    let records = store.records_for_run(outcome.run_id).unwrap();
    let urls: Vec<&str> = records.iter().map(|r| r.url()).collect();
    assert_eq!(
        urls,
        vec![
            format!("{base}/"),
            format!("{base}/page1"),
            format!("{base}/page2?utm_source=feed"),
            format!("{base}/broken"),
        ]
    );

    let broken = &records[3];
    assert!(broken.error().unwrap().contains("HTTP 500"));
    assert!(records[1].body().unwrap().contains("/page3"));
    assert_eq!(
        records[2].metadata().and_then(|m| m.get("referrer")).cloned(),
        Some(format!("{base}/"))
    );

    // page3 sits at depth 2
    let requests = server.received_requests().await.unwrap();
    // links are visited with their query untouched
    assert!(requests
        .iter()
        .any(|r| r.url.path() == "/page2" && r.url.query() == Some("utm_source=feed")));
    assert!(!requests.iter().any(|r| r.url.path() == "/page3"));
    // the 500 was retried once
    assert_eq!(
        requests.iter().filter(|r| r.url.path() == "/broken").count(),
        2
    );

    let run = store.get_run(outcome.run_id).unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.stats, outcome.stats);
    assert_eq!(
        run.config_hash,
        compute_config_hash(&workspace.config_path).unwrap()
    );
}

#[tokio::test]
async fn test_second_run_skips_stored_pages() {
    let server = mock_site().await;
    let workspace = Workspace::new(
        &server.uri(),
        "max-depth = 1",
        "enabled = true\nseed-from-store = true",
    );

    let first = run_once(&workspace).await;
    assert_eq!(first.stats.count_output, 3);

    let second = run_once(&workspace).await;
    // Only the page that failed last time is tried again
    assert_eq!(second.stats.count_input, 1);
    assert_eq!(second.stats.count_output, 0);
    assert_eq!(second.stats.count_error, 1);

    let store = open_store(&workspace.db_path).unwrap();
    let summary = load_statistics(&store).unwrap().unwrap();
    assert_eq!(summary.run.id, second.run_id);
    assert!(workspace.path().join("crawl.db").exists());
}
