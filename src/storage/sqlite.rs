//! SQLite record store
//!
//! This module provides a SQLite-based implementation of the RecordStore trait.

use crate::output::CrawlStats;
use crate::state::{CrawlResult, Metadata};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{RecordStore, StorageError, StorageResult};
use crate::storage::{RunRecord, RunStatus};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

const RUN_COLUMNS: &str =
    "id, started_at, finished_at, config_hash, status, count_input, count_output, count_error";

/// SQLite record store
pub struct SqliteRecordStore {
    conn: Connection,
}

impl SqliteRecordStore {
    /// Opens or creates a record store
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteRecordStore)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(4)?).unwrap_or(RunStatus::Running),
        stats: CrawlStats {
            count_input: row.get::<_, i64>(5)?.max(0) as u64,
            count_output: row.get::<_, i64>(6)?.max(0) as u64,
            count_error: row.get::<_, i64>(7)?.max(0) as u64,
        },
    })
}

impl RecordStore for SqliteRecordStore {
    // ===== Run Management =====

    fn begin_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn finish_run(
        &mut self,
        run_id: i64,
        stats: &CrawlStats,
        status: RunStatus,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs
             SET status = ?1, finished_at = ?2, count_input = ?3, count_output = ?4, count_error = ?5
             WHERE id = ?6",
            params![
                status.to_db_string(),
                now,
                stats.count_input as i64,
                stats.count_output as i64,
                stats.count_error as i64,
                run_id
            ],
        )?;

        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        let sql = format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS);
        self.conn
            .query_row(&sql, params![run_id], run_from_row)
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let sql = format!("SELECT {} FROM runs ORDER BY id DESC LIMIT 1", RUN_COLUMNS);
        let run = self.conn.query_row(&sql, [], run_from_row).optional()?;
        Ok(run)
    }

    // ===== Records =====

    fn append(&mut self, run_id: i64, result: &CrawlResult) -> StorageResult<()> {
        let metadata = result.metadata().map(serde_json::to_string).transpose()?;
        self.conn.execute(
            "INSERT INTO records (run_id, url, timestamp, body, error, metadata)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                run_id,
                result.url(),
                result.timestamp(),
                result.body(),
                result.error(),
                metadata
            ],
        )?;
        Ok(())
    }

    fn records_for_run(&self, run_id: i64) -> StorageResult<Vec<CrawlResult>> {
        let mut stmt = self.conn.prepare(
            "SELECT url, timestamp, body, error, metadata FROM records WHERE run_id = ?1 ORDER BY id",
        )?;

        let rows = stmt.query_map(params![run_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, Option<String>>(4)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (url, timestamp, body, error, metadata) = row?;
            let metadata = metadata
                .as_deref()
                .map(serde_json::from_str::<Metadata>)
                .transpose()?;
            let record = CrawlResult::from_parts(url.clone(), timestamp, body, error, metadata)
                .ok_or_else(|| StorageError::InvalidRecord {
                    url,
                    message: "expected exactly one of body and error".to_string(),
                })?;
            records.push(record);
        }

        Ok(records)
    }

    fn successful_urls(&self) -> StorageResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT url FROM records WHERE body IS NOT NULL ORDER BY url")?;
        let urls = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(urls)
    }
}
