//! Storage traits and error types
//!
//! [`ListingSink`] is the seam between the crawl controller and wherever
//! records end up. [`Storage`] is the run and listing bookkeeping the SQLite
//! backend offers on top.

use crate::extract::ListingRecord;
use crate::storage::{RunRecord, RunStatus};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Receives every record the crawl emits
///
/// A failed `accept` is logged and counted by the caller; the crawl goes on.
pub trait ListingSink {
    fn accept(&mut self, record: &ListingRecord) -> StorageResult<()>;

    /// Pushes buffered output to its destination
    fn flush(&mut self) -> StorageResult<()> {
        Ok(())
    }
}

/// In-memory collector, mostly for tests and dry runs
impl ListingSink for Vec<ListingRecord> {
    fn accept(&mut self, record: &ListingRecord) -> StorageResult<()> {
        self.push(record.clone());
        Ok(())
    }
}

/// Run bookkeeping and listing queries for a persistent backend
pub trait Storage {
    // ===== Run Management =====

    /// Creates a new crawl run and returns its ID
    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64>;

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    /// Closes a run with its final status and counters
    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        pages_fetched: u64,
        records_emitted: u64,
    ) -> StorageResult<()>;

    fn count_runs(&self) -> StorageResult<u64>;

    // ===== Listings =====

    /// Inserts or replaces the listing keyed by its canonical URL
    fn upsert_listing(&mut self, record: &ListingRecord) -> StorageResult<()>;

    fn get_listing(&self, url: &str) -> StorageResult<Option<ListingRecord>>;

    fn count_listings(&self) -> StorageResult<u64>;
}
