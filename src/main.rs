//! Trawl main entry point
//!
//! This is the command-line interface for the Trawl page crawler.

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use trawl::config::{load_config_with_hash, Config};
use trawl::crawler::{crawl, load_scripts, StopReason};
use trawl::input::load_seeds;
use trawl::output::{load_statistics, print_counts, print_statistics};
use trawl::renderer::HttpRenderer;
use trawl::storage::open_store;
use tracing_subscriber::EnvFilter;

/// Trawl: a scripted, depth-bounded page crawler
///
/// Trawl visits seed URLs, runs pattern-keyed action scripts on each page,
/// follows links up to a maximum depth and stores one record per URL.
#[derive(Parser, Debug)]
#[command(name = "trawl")]
#[command(version)]
#[command(about = "A scripted, depth-bounded page crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Seed file to use instead of the one in the configuration
    #[arg(long, value_name = "PATH")]
    seeds: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config, scripts and seeds and show what would be crawled
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics of the latest run and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    let seeds_path = cli.seeds.clone().unwrap_or_else(|| config.input.path.clone());

    if cli.dry_run {
        handle_dry_run(&config, &seeds_path)
    } else if cli.stats {
        handle_stats(&config)
    } else {
        handle_crawl(config, config_hash, &seeds_path).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("trawl=info,warn"),
            1 => EnvFilter::new("trawl=debug,info"),
            2 => EnvFilter::new("trawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates inputs and shows what would be crawled
fn handle_dry_run(config: &Config, seeds_path: &Path) -> anyhow::Result<()> {
    let (load_actions, crawl_actions) = load_scripts(&config.scripts)?;
    let seeds = load_seeds(seeds_path, config.input.format)
        .with_context(|| format!("failed to load seeds from {}", seeds_path.display()))?;

    println!("=== Trawl Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Max retries: {}", config.crawler.max_retries);
    println!("  Fail fast: {}", config.crawler.fail_fast);
    match config.crawler.max_errors {
        Some(max_errors) => println!("  Max errors: {}", max_errors),
        None => println!("  Max errors: unlimited"),
    }
    println!("  Sleep after success: {}s", config.crawler.sleep_success);
    println!("  Sleep after error: {}s", config.crawler.sleep_error);
    if let Some(pause) = config.crawler.sleep_after_load {
        println!("  Sleep after load: {}s", pause);
    }

    println!("\nDedup:");
    if config.dedup.enabled {
        println!("  Kind: {:?}", config.dedup.kind);
        println!("  Seed from store: {}", config.dedup.seed_from_store);
    } else {
        println!("  Disabled");
    }

    println!("\nRenderer:");
    println!("  User agent: {}", config.renderer.user_agent);
    println!("  Page timeout: {}s", config.renderer.page_timeout);

    println!("\nScripts:");
    println!("  Load actions: {} plan(s)", load_actions.plans().len());
    println!("  Crawl actions: {} plan(s)", crawl_actions.plans().len());

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);

    println!("\nSeeds ({}):", seeds.len());
    for seed in &seeds {
        println!("  - {}", seed.url);
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would start crawling with {} seed URLs", seeds.len());

    Ok(())
}

/// Handles the --stats mode: shows statistics of the latest run
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let store = open_store(Path::new(&config.output.database_path))?;

    match load_statistics(&store)? {
        Some(summary) => print_statistics(&summary),
        None => println!("No crawl runs found"),
    }

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, config_hash: String, seeds_path: &Path) -> anyhow::Result<()> {
    let seeds = load_seeds(seeds_path, config.input.format)
        .with_context(|| format!("failed to load seeds from {}", seeds_path.display()))?;

    let store = open_store(Path::new(&config.output.database_path))
        .with_context(|| format!("failed to open {}", config.output.database_path))?;
    let renderer = HttpRenderer::new(&config.renderer).context("failed to build HTTP client")?;

    let outcome = match crawl(&config, &config_hash, seeds, renderer, store).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    if outcome.dropped_seeds > 0 {
        tracing::warn!("{} seed(s) were skipped as invalid", outcome.dropped_seeds);
    }
    if outcome.stop_reason == StopReason::ErrorCeiling {
        tracing::warn!("Run stopped early: {}", outcome.stop_reason);
    }

    println!("=== Crawl run {} ({}) ===\n", outcome.run_id, outcome.stop_reason);
    print_counts(&outcome.stats);

    Ok(())
}
