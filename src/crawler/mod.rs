//! Crawler module for scripted page crawling
//!
//! This module contains the core crawling logic, including:
//! - The frontier with depth bounding, dedup and parked retries
//! - Retry and backoff decisions
//! - Overall crawl coordination

mod coordinator;
mod frontier;
mod retry;

pub use coordinator::{Coordinator, CrawlOutcome, StopReason};
pub use frontier::{Frontier, Rejection};
pub use retry::{RetryController, RetryDecision};

use crate::actions::{ActionScript, ScriptError};
use crate::config::{Config, ScriptsConfig};
use crate::input::Seed;
use crate::renderer::PageRenderer;
use crate::storage::RecordStore;
use crate::TrawlError;

/// Loads the load-actions and crawl-actions scripts named in the configuration
///
/// Missing entries yield empty scripts.
///
/// # Returns
///
/// * `Ok((load_actions, crawl_actions))` - Both scripts
/// * `Err(ScriptError)` - A script could not be read or parsed
pub fn load_scripts(config: &ScriptsConfig) -> Result<(ActionScript, ActionScript), ScriptError> {
    let load = match &config.load_actions {
        Some(path) => ActionScript::load(path)?,
        None => ActionScript::default(),
    };
    let crawl = match &config.crawl_actions {
        Some(path) => ActionScript::load(path)?,
        None => ActionScript::default(),
    };
    Ok((load, crawl))
}

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Load the action scripts
/// 2. Mark previously crawled URLs as visited, if configured
/// 3. Seed the frontier
/// 4. Run the crawl loop until the frontier is exhausted or the error
///    ceiling is reached
///
/// # Arguments
///
/// * `config` - The run configuration
/// * `config_hash` - Hash of the configuration file, stored with the run
/// * `seeds` - Starting URLs
/// * `renderer` - The page session to drive
/// * `store` - Where records are written
///
/// # Returns
///
/// * `Ok(CrawlOutcome)` - Crawl finished
/// * `Err(TrawlError)` - Crawl failed
pub async fn crawl<R, S>(
    config: &Config,
    config_hash: &str,
    seeds: Vec<Seed>,
    renderer: R,
    store: S,
) -> Result<CrawlOutcome, TrawlError>
where
    R: PageRenderer,
    S: RecordStore,
{
    let (load_actions, crawl_actions) = load_scripts(&config.scripts)?;

    let mut coordinator = Coordinator::new(config, renderer, store)
        .with_load_actions(load_actions)
        .with_crawl_actions(crawl_actions)
        .with_config_hash(config_hash);

    if config.dedup.enabled && config.dedup.seed_from_store {
        coordinator.preload_visited()?;
    }

    let accepted = coordinator.seed(seeds);
    tracing::info!("Seeded frontier with {} request(s)", accepted);

    coordinator.run().await
}
