//! Crawl statistics
//!
//! Live counters kept by the frontier during a run, and the summary of a
//! finished run read back from the record store.

use crate::storage::{RecordStore, RunRecord, StorageResult};
use std::fmt;

/// Per-run counters
///
/// `count_input` counts accepted enqueues, `count_output` success records and
/// `count_error` error records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlStats {
    pub count_input: u64,
    pub count_output: u64,
    pub count_error: u64,
}

impl CrawlStats {
    /// Number of requests that produced a terminal record
    pub fn finished(&self) -> u64 {
        self.count_output + self.count_error
    }

    /// True when every accepted request produced exactly one record
    pub fn is_balanced(&self) -> bool {
        self.count_input == self.finished()
    }
}

impl fmt::Display for CrawlStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "count_input={} count_output={} count_error={}",
            self.count_input, self.count_output, self.count_error
        )
    }
}

/// A finished (or interrupted) run as recorded in the store
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub run: RunRecord,
    pub duration_seconds: Option<u64>,
}

/// Loads the summary of the most recent run
///
/// # Arguments
///
/// * `store` - The record store to query
///
/// # Returns
///
/// * `Ok(Some(RunSummary))` - The latest run
/// * `Ok(None)` - The store holds no runs yet
/// * `Err(StorageError)` - Failed to query the store
pub fn load_statistics(store: &dyn RecordStore) -> StorageResult<Option<RunSummary>> {
    let Some(run) = store.latest_run()? else {
        return Ok(None);
    };

    let duration_seconds = match (
        run.started_at.parse::<chrono::DateTime<chrono::Utc>>(),
        run.finished_at
            .as_deref()
            .map(str::parse::<chrono::DateTime<chrono::Utc>>),
    ) {
        (Ok(started), Some(Ok(finished))) => {
            Some((finished - started).num_seconds().max(0) as u64)
        }
        _ => None,
    };

    Ok(Some(RunSummary {
        run,
        duration_seconds,
    }))
}

/// Prints a run summary to stdout
pub fn print_statistics(summary: &RunSummary) {
    let run = &summary.run;
    println!("=== Crawl Statistics ===\n");

    println!("Run #{}", run.id);
    println!("  Status: {}", run.status.to_db_string());
    println!("  Started: {}", run.started_at);
    if let Some(finished) = &run.finished_at {
        println!("  Finished: {}", finished);
    }
    if let Some(seconds) = summary.duration_seconds {
        println!("  Duration: {}s", seconds);
    }
    println!("  Config hash: {}", run.config_hash);
    println!();

    print_counts(&run.stats);
}

/// Prints the completion summary of a run
pub fn print_counts(stats: &CrawlStats) {
    println!("Requests:");
    println!("  Input:  {}", stats.count_input);
    println!("  Output: {}", stats.count_output);
    println!("  Errors: {}", stats.count_error);

    let success_rate = if stats.finished() > 0 {
        (stats.count_output as f64 / stats.finished() as f64) * 100.0
    } else {
        0.0
    };
    println!(
        "Success Rate: {:.1}% ({} / {} requests)",
        success_rate,
        stats.count_output,
        stats.finished()
    );
}
