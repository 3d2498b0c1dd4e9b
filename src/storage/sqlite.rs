//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::records::{DetailRecord, JobRecord};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{RunRecord, RunStatus};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

const RUN_COLUMNS: &str =
    "id, started_at, finished_at, config_hash, strategy, status, record_count";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
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
        strategy: row.get(4)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(5)?)
            .unwrap_or(RunStatus::Failed),
        record_count: row.get::<_, i64>(6)? as usize,
    })
}

impl Storage for SqliteStorage {
    // ===== Run Management =====

    fn create_run(&mut self, config_hash: &str, strategy: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, strategy, status) VALUES (?1, ?2, ?3, ?4)",
            params![now, config_hash, strategy, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        record_count: usize,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, record_count = ?3 WHERE id = ?4",
            params![status.to_db_string(), now, record_count as i64, run_id],
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

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let sql = format!("SELECT {} FROM runs ORDER BY id DESC LIMIT 1", RUN_COLUMNS);
        let run = self.conn.query_row(&sql, [], run_from_row).optional()?;
        Ok(run)
    }

    // ===== Records =====

    fn insert_records(&mut self, run_id: i64, records: &[DetailRecord]) -> StorageResult<usize> {
        let tx = self.conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO jobs (run_id, position, title, department_or_company,
                 location, posted_age, url, minimum_qualifications, preferred_qualifications)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            )?;

            for (position, detail) in records.iter().enumerate() {
                let record = &detail.record;
                inserted += stmt.execute(params![
                    run_id,
                    position as i64,
                    record.title,
                    record.department_or_company,
                    record.location,
                    record.posted_age,
                    record.url,
                    detail.minimum_qualifications,
                    detail.preferred_qualifications,
                ])?;
            }
        }
        tx.commit()?;

        Ok(inserted)
    }

    fn get_run_records(&self, run_id: i64) -> StorageResult<Vec<DetailRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT title, department_or_company, location, posted_age, url,
             minimum_qualifications, preferred_qualifications
             FROM jobs WHERE run_id = ?1 ORDER BY position",
        )?;

        let records = stmt
            .query_map(params![run_id], |row| {
                Ok(DetailRecord {
                    record: JobRecord {
                        title: row.get(0)?,
                        department_or_company: row.get(1)?,
                        location: row.get(2)?,
                        posted_age: row.get(3)?,
                        url: row.get(4)?,
                    },
                    minimum_qualifications: row.get(5)?,
                    preferred_qualifications: row.get(6)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }
}
