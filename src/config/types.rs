use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for Trawl
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub dedup: DedupConfig,
    #[serde(default)]
    pub scripts: ScriptsConfig,
    pub input: InputConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub renderer: RendererConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum number of link hops from a seed URL
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Maximum number of retries after a failed attempt
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Number of terminal errors after which the run stops dequeuing
    #[serde(rename = "max-errors")]
    pub max_errors: Option<u32>,

    /// Give up at once on errors that repeat on every attempt
    #[serde(rename = "fail-fast")]
    pub fail_fast: bool,

    /// Pause after a successful page (seconds)
    #[serde(rename = "sleep-success")]
    pub sleep_success: f64,

    /// Backoff before a failed page is retried (seconds)
    #[serde(rename = "sleep-error")]
    pub sleep_error: f64,

    /// Pause after load actions on every page (seconds)
    #[serde(rename = "sleep-after-load")]
    pub sleep_after_load: Option<f64>,

    /// Log progress every N dequeued requests
    #[serde(rename = "report-interval")]
    pub report_interval: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: 0,
            max_retries: 0,
            max_errors: None,
            fail_fast: false,
            sleep_success: 3.0,
            sleep_error: 10.0,
            sleep_after_load: None,
            report_interval: 100,
        }
    }
}

/// Converts seconds to a `Duration`, or `None` if the value is negative,
/// not finite or too large to represent
pub(crate) fn seconds_to_duration(seconds: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(seconds).ok()
}

/// Pause accessors
///
/// Validation rejects values `seconds_to_duration` cannot convert; an
/// unvalidated out-of-range value reads as zero.
impl CrawlerConfig {
    pub fn sleep_success(&self) -> Duration {
        seconds_to_duration(self.sleep_success).unwrap_or_default()
    }

    pub fn sleep_error(&self) -> Duration {
        seconds_to_duration(self.sleep_error).unwrap_or_default()
    }

    pub fn sleep_after_load(&self) -> Option<Duration> {
        self.sleep_after_load
            .map(|seconds| seconds_to_duration(seconds).unwrap_or_default())
    }
}

/// Which dedup filter backs the frontier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DedupKind {
    /// Hash set, no false positives, memory grows with the crawl
    Exact,
    /// Bloom filter, bounded memory, may skip a small fraction of new URLs
    Bloom,
}

/// URL dedup configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    /// Whether URLs are deduplicated at all
    pub enabled: bool,

    pub kind: DedupKind,

    /// Expected number of distinct URLs (bloom sizing)
    #[serde(rename = "expected-items")]
    pub expected_items: usize,

    /// Target false positive rate (bloom sizing)
    #[serde(rename = "false-positive-rate")]
    pub false_positive_rate: f64,

    /// Mark URLs of earlier successful records as visited before seeding
    #[serde(rename = "seed-from-store")]
    pub seed_from_store: bool,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            kind: DedupKind::Exact,
            expected_items: 1_000_000,
            false_positive_rate: 0.001,
            seed_from_store: false,
        }
    }
}

/// Action script locations
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScriptsConfig {
    /// Script run after every page load
    #[serde(rename = "load-actions")]
    pub load_actions: Option<PathBuf>,

    /// Script run before anchors are collected for link discovery
    #[serde(rename = "crawl-actions")]
    pub crawl_actions: Option<PathBuf>,
}

/// Format of the seed file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    /// One URL per line
    #[default]
    Text,
    /// One JSON object per line with `url` and optional `metadata`
    Jsonl,
}

/// Seed input configuration
#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    /// Path to the seed file
    pub path: PathBuf,

    #[serde(default)]
    pub format: InputFormat,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

/// Page renderer configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// User agent sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Maximum time a navigation may take (seconds)
    #[serde(rename = "page-timeout")]
    pub page_timeout: u64,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("trawl/{}", env!("CARGO_PKG_VERSION")),
            page_timeout: 30,
        }
    }
}

impl RendererConfig {
    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.page_timeout)
    }
}
