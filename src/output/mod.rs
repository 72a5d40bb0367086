//! Output module for crawl statistics and run summaries
//!
//! Records themselves are written by the record store; this module turns
//! counters and stored runs into log lines and terminal reports.

pub mod stats;

pub use stats::{load_statistics, print_counts, print_statistics, CrawlStats, RunSummary};
