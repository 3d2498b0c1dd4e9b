//! Storage traits and error types

use crate::records::DetailRecord;
use crate::storage::{RunRecord, RunStatus};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for run archive backends
pub trait Storage {
    // ===== Run Management =====

    /// Creates a new harvest run
    ///
    /// # Arguments
    ///
    /// * `config_hash` - Hash of the configuration file
    /// * `strategy` - Name of the discovery strategy
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(&mut self, config_hash: &str, strategy: &str) -> StorageResult<i64>;

    /// Records the final status and record count of a run
    fn finish_run(&mut self, run_id: i64, status: RunStatus, record_count: usize)
        -> StorageResult<()>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    // ===== Records =====

    /// Stores the records of a run in order
    ///
    /// A record repeating the (title, url) pair of one already stored for the
    /// run is ignored.
    ///
    /// # Returns
    ///
    /// The number of rows actually inserted
    fn insert_records(&mut self, run_id: i64, records: &[DetailRecord]) -> StorageResult<usize>;

    /// Loads the records of a run in the order they were stored
    fn get_run_records(&self, run_id: i64) -> StorageResult<Vec<DetailRecord>>;
}
