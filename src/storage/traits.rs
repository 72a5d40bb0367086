//! Storage traits and error types
//!
//! This module defines the trait interface for record stores and associated
//! error types.

use crate::output::CrawlStats;
use crate::state::CrawlResult;
use crate::storage::{RunRecord, RunStatus};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Invalid stored record for {url}: {message}")]
    InvalidRecord { url: String, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for record store implementations
///
/// A record store receives exactly one [`CrawlResult`] per finished request
/// and keeps a row per run with its final counters.
pub trait RecordStore {
    // ===== Run Management =====

    /// Opens a new run
    ///
    /// # Arguments
    ///
    /// * `config_hash` - Hash of the configuration file
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn begin_run(&mut self, config_hash: &str) -> StorageResult<i64>;

    /// Closes a run with its final counters and status
    fn finish_run(&mut self, run_id: i64, stats: &CrawlStats, status: RunStatus)
        -> StorageResult<()>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn latest_run(&self) -> StorageResult<Option<RunRecord>>;

    // ===== Records =====

    /// Appends a terminal record to a run
    fn append(&mut self, run_id: i64, result: &CrawlResult) -> StorageResult<()>;

    /// Gets all records of a run in insertion order
    fn records_for_run(&self, run_id: i64) -> StorageResult<Vec<CrawlResult>>;

    /// Gets the distinct URLs of every successful record across all runs
    fn successful_urls(&self) -> StorageResult<Vec<String>>;
}
