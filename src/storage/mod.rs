//! Storage module for persisting crawl records
//!
//! This module handles all database operations for the crawler, including:
//! - SQLite database initialization and schema management
//! - One terminal record per crawled request
//! - Run tracking with final counters

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteRecordStore;
pub use traits::{RecordStore, StorageError, StorageResult};

use crate::output::CrawlStats;
use std::path::Path;

/// Initializes or opens a record store
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteRecordStore)` - Successfully initialized store
/// * `Err(StorageError)` - Failed to initialize store
pub fn open_store(path: &Path) -> StorageResult<SqliteRecordStore> {
    SqliteRecordStore::new(path)
}

/// Represents a crawl run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
    pub stats: CrawlStats,
}

/// Status of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    /// The frontier was exhausted
    Completed,
    /// The error ceiling stopped the run
    Stopped,
    /// The run aborted with a fatal error
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Stopped => "stopped",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "stopped" => Some(Self::Stopped),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}
