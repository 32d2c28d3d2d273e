//! Storage module for persisting crawl output
//!
//! This module handles everything downstream of extraction:
//! - the [`ListingSink`] seam the crawl controller emits records into
//! - SQLite persistence with per-URL upserts and run tracking
//! - JSON-lines export

mod jsonl;
mod schema;
mod sqlite;
mod traits;

pub use jsonl::{JsonLinesSink, SinkSet};
pub use sqlite::{init_database, SqliteListingStore};
pub use traits::{ListingSink, Storage, StorageError, StorageResult};

/// Represents a crawl run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
    pub pages_fetched: u64,
    pub records_emitted: u64,
}

/// Status of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}
