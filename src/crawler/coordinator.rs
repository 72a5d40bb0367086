//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop. For every request it:
//! - Navigates the renderer, bounded by the page timeout
//! - Runs the load actions and captures the page body
//! - Runs the crawl actions and enqueues discovered links while depth allows
//! - Writes a success record, or hands the failure to the retry controller
//!
//! The loop stops when the frontier is exhausted or the error ceiling is hit.

use crate::actions::ActionScript;
use crate::config::Config;
use crate::crawler::frontier::Frontier;
use crate::crawler::retry::{RetryController, RetryDecision};
use crate::dedup::DedupFilter;
use crate::input::Seed;
use crate::output::CrawlStats;
use crate::renderer::{PageRenderer, RenderError};
use crate::state::{CrawlRequest, CrawlResult, Metadata, RequestState};
use crate::storage::{RecordStore, RunStatus};
use crate::url::{normalize_url, resolve_link};
use crate::{PageError, TrawlError};
use std::fmt;
use std::time::Duration;
use url::Url;

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// No request is queued or parked
    FrontierExhausted,
    /// The terminal error tally reached `max-errors`
    ErrorCeiling,
}

impl StopReason {
    pub fn run_status(&self) -> RunStatus {
        match self {
            StopReason::FrontierExhausted => RunStatus::Completed,
            StopReason::ErrorCeiling => RunStatus::Stopped,
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::FrontierExhausted => write!(f, "frontier exhausted"),
            StopReason::ErrorCeiling => write!(f, "error ceiling reached"),
        }
    }
}

/// Result of a finished run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlOutcome {
    pub run_id: i64,
    pub stats: CrawlStats,
    pub stop_reason: StopReason,
    /// Seeds skipped because their URL did not normalize
    pub dropped_seeds: usize,
}

/// Timing and depth settings the loop needs per request
#[derive(Debug, Clone)]
struct CrawlSettings {
    max_depth: u32,
    sleep_success: Duration,
    sleep_after_load: Option<Duration>,
    page_timeout: Duration,
    report_interval: u64,
}

impl CrawlSettings {
    fn from_config(config: &Config) -> Self {
        Self {
            max_depth: config.crawler.max_depth,
            sleep_success: config.crawler.sleep_success(),
            sleep_after_load: config.crawler.sleep_after_load(),
            page_timeout: config.renderer.page_timeout(),
            report_interval: config.crawler.report_interval.max(1),
        }
    }
}

/// Main crawler coordinator structure
///
/// Owns the renderer, the record store and all per-run state. Requests are
/// processed one at a time.
pub struct Coordinator<R, S> {
    settings: CrawlSettings,
    renderer: R,
    store: S,
    frontier: Frontier,
    retry: RetryController,
    load_actions: ActionScript,
    crawl_actions: ActionScript,
    config_hash: String,
    dropped_seeds: usize,
}

impl<R, S> Coordinator<R, S>
where
    R: PageRenderer,
    S: RecordStore,
{
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The run configuration
    /// * `renderer` - The page session to drive
    /// * `store` - Where records and the run row are written
    pub fn new(config: &Config, renderer: R, store: S) -> Self {
        Self {
            settings: CrawlSettings::from_config(config),
            renderer,
            store,
            frontier: Frontier::new(config.crawler.max_depth, DedupFilter::from_config(&config.dedup)),
            retry: RetryController::from_config(&config.crawler),
            load_actions: ActionScript::default(),
            crawl_actions: ActionScript::default(),
            config_hash: String::new(),
            dropped_seeds: 0,
        }
    }

    /// Sets the script run after every page load
    pub fn with_load_actions(mut self, script: ActionScript) -> Self {
        self.load_actions = script;
        self
    }

    /// Sets the script run before links are collected
    pub fn with_crawl_actions(mut self, script: ActionScript) -> Self {
        self.crawl_actions = script;
        self
    }

    /// Sets the configuration hash stored with the run
    pub fn with_config_hash(mut self, config_hash: impl Into<String>) -> Self {
        self.config_hash = config_hash.into();
        self
    }

    /// Marks the URLs of earlier successful records as visited
    ///
    /// Has no effect on the frontier when dedup is disabled.
    ///
    /// # Returns
    ///
    /// The number of stored URLs that were marked
    pub fn preload_visited(&mut self) -> Result<usize, TrawlError> {
        let mut marked = 0;
        for stored in self.store.successful_urls()? {
            match normalize_url(&stored) {
                Ok(url) => {
                    self.frontier.mark_visited(&url);
                    marked += 1;
                }
                Err(e) => tracing::debug!("Not preloading stored URL {}: {}", stored, e),
            }
        }
        tracing::info!("Marked {} previously crawled URL(s) as visited", marked);
        Ok(marked)
    }

    /// Adds seed requests at depth 0
    ///
    /// Seeds that fail normalization are skipped with a warning; duplicates
    /// are dropped by the dedup filter.
    ///
    /// # Returns
    ///
    /// The number of seeds that entered the frontier
    pub fn seed(&mut self, seeds: impl IntoIterator<Item = Seed>) -> usize {
        let mut accepted = 0;

        for seed in seeds {
            let url = match normalize_url(&seed.url) {
                Ok(url) => url,
                Err(e) => {
                    tracing::warn!("Skipping invalid seed {}: {}", seed.url, e);
                    self.dropped_seeds += 1;
                    continue;
                }
            };

            match self.frontier.enqueue_with_metadata(&url, 0, seed.metadata) {
                Ok(()) => accepted += 1,
                Err(rejection) => tracing::trace!("Seed {} not queued: {}", url, rejection),
            }
        }

        accepted
    }

    /// Runs the main crawl loop
    ///
    /// Opens a run in the record store, processes requests until the frontier
    /// is exhausted or the error ceiling is reached, then closes the run with
    /// the final counters.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlOutcome)` - The run ended normally
    /// * `Err(TrawlError)` - A storage failure or internal error aborted the run
    pub async fn run(&mut self) -> Result<CrawlOutcome, TrawlError> {
        let run_id = self.store.begin_run(&self.config_hash)?;
        tracing::info!(
            "Starting crawl run {} with {} queued request(s)",
            run_id,
            self.frontier.pending_len()
        );

        let stop_reason = match self.crawl_loop(run_id).await {
            Ok(reason) => reason,
            Err(e) => {
                tracing::error!("Crawl run {} failed: {}", run_id, e);
                if let Err(store_err) =
                    self.store
                        .finish_run(run_id, &self.frontier.stats(), RunStatus::Failed)
                {
                    tracing::error!("Failed to close run {}: {}", run_id, store_err);
                }
                return Err(e);
            }
        };

        let stats = self.frontier.stats();
        self.store
            .finish_run(run_id, &stats, stop_reason.run_status())?;

        tracing::info!("Crawl run {} finished ({}): {}", run_id, stop_reason, stats);
        if stop_reason == StopReason::FrontierExhausted && !stats.is_balanced() {
            tracing::warn!("Run {} ended with unbalanced counters: {}", run_id, stats);
        }

        Ok(CrawlOutcome {
            run_id,
            stats,
            stop_reason,
            dropped_seeds: self.dropped_seeds,
        })
    }

    async fn crawl_loop(&mut self, run_id: i64) -> Result<StopReason, TrawlError> {
        let mut processed: u64 = 0;

        loop {
            if self.retry.ceiling_reached() {
                tracing::warn!(
                    "Error ceiling reached after {} terminal error(s), stopping",
                    self.retry.error_count()
                );
                return Ok(StopReason::ErrorCeiling);
            }

            let Some(request) = self.frontier.next_request().await else {
                tracing::info!("Frontier is empty, crawl complete");
                return Ok(StopReason::FrontierExhausted);
            };

            self.process_request(run_id, request).await?;
            processed += 1;

            if processed % self.settings.report_interval == 0 {
                tracing::info!(
                    "Progress: {} request(s) processed, {} pending, {} parked, {}",
                    processed,
                    self.frontier.pending_len(),
                    self.frontier.parked_len(),
                    self.frontier.stats()
                );
            }
        }
    }

    /// Processes one request through its lifecycle
    async fn process_request(
        &mut self,
        run_id: i64,
        request: CrawlRequest,
    ) -> Result<(), TrawlError> {
        tracing::debug!(
            "Processing {} (depth {}, attempt {})",
            request.url,
            request.depth,
            request.attempt()
        );

        let mut state = RequestState::Pending.transition(RequestState::Rendering)?;

        let loaded = match self.navigate(&request.url).await {
            Ok(()) => {
                state = state.transition(RequestState::LoadActions)?;
                self.run_load_actions(&request.url).await
            }
            Err(error) => Err(error),
        };

        match loaded {
            Ok(body) => {
                if self.should_discover(&request) {
                    state = state.transition(RequestState::LinkDiscovery)?;
                    self.discover_links(&request).await;
                }
                state.transition(RequestState::Succeeded)?;

                let record = CrawlResult::success(&request.url, body, request.metadata.clone());
                self.store.append(run_id, &record)?;
                self.frontier.record_success();
                tracing::debug!("Crawled {}", request.url);

                if !self.settings.sleep_success.is_zero() {
                    tokio::time::sleep(self.settings.sleep_success).await;
                }
            }
            Err(error) => {
                let failed = state.transition(RequestState::Failed)?;
                match self.retry.on_failure(&request, &error) {
                    RetryDecision::Retry {
                        request: next,
                        delay,
                    } => {
                        failed.transition(RequestState::Pending)?;
                        tracing::warn!(
                            "Attempt {} of {} failed: {}; retrying in {:?}",
                            request.attempt(),
                            request.url,
                            error,
                            delay
                        );
                        self.frontier.reenqueue(next, delay);
                    }
                    RetryDecision::GiveUp => {
                        failed.transition(RequestState::GivenUp)?;
                        tracing::error!(
                            "Giving up on {} after {} attempt(s): {}",
                            request.url,
                            request.attempt(),
                            error
                        );
                        let record = CrawlResult::failure(
                            &request.url,
                            error.to_string(),
                            request.metadata.clone(),
                        );
                        self.store.append(run_id, &record)?;
                        self.frontier.record_error();
                    }
                }
            }
        }

        Ok(())
    }

    /// Navigates to the URL, failing if the page does not load in time
    async fn navigate(&mut self, url: &str) -> Result<(), PageError> {
        match tokio::time::timeout(self.settings.page_timeout, self.renderer.navigate(url)).await {
            Ok(result) => result.map_err(PageError::Navigation),
            Err(_) => Err(PageError::Navigation(RenderError::Timeout {
                url: url.to_string(),
            })),
        }
    }

    /// Runs the load actions and captures the page body
    async fn run_load_actions(&mut self, url: &str) -> Result<String, PageError> {
        self.load_actions.execute(url, &mut self.renderer).await?;

        if let Some(pause) = self.settings.sleep_after_load {
            tokio::time::sleep(pause).await;
        }

        self.renderer
            .current_html()
            .await
            .map_err(|source| PageError::Interaction {
                action: "capture page".to_string(),
                source,
            })
    }

    fn should_discover(&self, request: &CrawlRequest) -> bool {
        self.settings.max_depth > 0 && request.depth < self.settings.max_depth
    }

    /// Runs the crawl actions and enqueues the page's links at depth + 1
    ///
    /// Failures are logged and end discovery; they never fail the page.
    async fn discover_links(&mut self, request: &CrawlRequest) {
        if let Err(e) = self
            .crawl_actions
            .execute(&request.url, &mut self.renderer)
            .await
        {
            tracing::warn!("Crawl actions failed on {}: {}", request.url, e);
            return;
        }

        let anchors = match self.renderer.anchors().await {
            Ok(anchors) => anchors,
            Err(e) => {
                tracing::warn!("Failed to collect links on {}: {}", request.url, e);
                return;
            }
        };

        let base = match Url::parse(&request.url) {
            Ok(base) => base,
            Err(e) => {
                tracing::warn!("Cannot resolve links against {}: {}", request.url, e);
                return;
            }
        };

        let referrer = Metadata::from([("referrer".to_string(), request.url.clone())]);
        let depth = request.depth + 1;
        let mut accepted = 0;

        for href in &anchors {
            let Some(link) = resolve_link(href, &base) else {
                tracing::trace!("Ignoring link {} on {}", href, request.url);
                continue;
            };

            match self
                .frontier
                .enqueue_with_metadata(&link, depth, Some(referrer.clone()))
            {
                Ok(()) => accepted += 1,
                Err(rejection) => tracing::trace!("Link {} not queued: {}", link, rejection),
            }
        }

        tracing::debug!(
            "Queued {} of {} link(s) found on {}",
            accepted,
            anchors.len(),
            request.url
        );
    }

    /// Current counters
    pub fn stats(&self) -> CrawlStats {
        self.frontier.stats()
    }

    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Consumes the coordinator, returning the renderer and store
    pub fn into_parts(self) -> (R, S) {
        (self.renderer, self.store)
    }
}
