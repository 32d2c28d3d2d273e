//! SQLite storage implementation
//!
//! Listings are upserted by canonical URL, so a listing seen on several pages
//! or in several runs ends up as a single row holding the latest values.

use crate::extract::ListingRecord;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{ListingSink, Storage, StorageError, StorageResult};
use crate::storage::{RunRecord, RunStatus};
use crate::HarvestError;
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteListingStore {
    conn: Connection,
    current_run: Option<i64>,
}

impl SqliteListingStore {
    /// Opens or creates the database at `path`
    pub fn new(path: &Path) -> Result<Self, HarvestError> {
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

        Ok(Self {
            conn,
            current_run: None,
        })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> Result<Self, HarvestError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn,
            current_run: None,
        })
    }

    /// The run new listings are attributed to
    pub fn current_run(&self) -> Option<i64> {
        self.current_run
    }
}

fn parse_timestamp(idx: usize, text: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(4)?).unwrap_or(RunStatus::Running),
        pages_fetched: row.get::<_, i64>(5)? as u64,
        records_emitted: row.get::<_, i64>(6)? as u64,
    })
}

fn listing_from_row(row: &Row<'_>) -> rusqlite::Result<ListingRecord> {
    Ok(ListingRecord {
        url: row.get(0)?,
        crawl_timestamp: parse_timestamp(1, &row.get::<_, String>(1)?)?,
        parse_timestamp: parse_timestamp(2, &row.get::<_, String>(2)?)?,
        thumbnail_url: row.get(3)?,
        referrer_url: row.get(4)?,
        address: row.get(5)?,
        city: row.get(6)?,
        state: row.get(7)?,
        zipcode: row.get(8)?,
        latitude: row.get(9)?,
        longitude: row.get(10)?,
        price: row.get(11)?,
        sqft: row.get(12)?,
        bedrooms: row.get(13)?,
        bathrooms: row.get(14)?,
        pet_friendly: row.get(15)?,
        furnished: row.get(16)?,
    })
}

const RUN_COLUMNS: &str =
    "id, started_at, finished_at, config_hash, status, pages_fetched, records_emitted";

const LISTING_COLUMNS: &str = "url, crawl_timestamp, parse_timestamp, thumbnail_url, \
    referrer_url, address, city, state, zipcode, latitude, longitude, price, sqft, \
    bedrooms, bathrooms, pet_friendly, furnished";

impl Storage for SqliteListingStore {
    // ===== Run Management =====

    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        let run_id = self.conn.last_insert_rowid();
        self.current_run = Some(run_id);
        Ok(run_id)
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS),
                params![run_id],
                run_from_row,
            )
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                &format!("SELECT {} FROM runs ORDER BY id DESC LIMIT 1", RUN_COLUMNS),
                [],
                run_from_row,
            )
            .optional()?;
        Ok(run)
    }

    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        pages_fetched: u64,
        records_emitted: u64,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, pages_fetched = ?3, records_emitted = ?4
             WHERE id = ?5",
            params![
                status.to_db_string(),
                now,
                pages_fetched as i64,
                records_emitted as i64,
                run_id
            ],
        )?;
        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn count_runs(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM runs", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    // ===== Listings =====

    fn upsert_listing(&mut self, record: &ListingRecord) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO listings (
                url, crawl_timestamp, parse_timestamp, thumbnail_url, referrer_url,
                address, city, state, zipcode, latitude, longitude,
                price, sqft, bedrooms, bathrooms, pet_friendly, furnished, run_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)
            ON CONFLICT(url) DO UPDATE SET
                crawl_timestamp = excluded.crawl_timestamp,
                parse_timestamp = excluded.parse_timestamp,
                thumbnail_url = excluded.thumbnail_url,
                referrer_url = excluded.referrer_url,
                address = excluded.address,
                city = excluded.city,
                state = excluded.state,
                zipcode = excluded.zipcode,
                latitude = excluded.latitude,
                longitude = excluded.longitude,
                price = excluded.price,
                sqft = excluded.sqft,
                bedrooms = excluded.bedrooms,
                bathrooms = excluded.bathrooms,
                pet_friendly = excluded.pet_friendly,
                furnished = excluded.furnished,
                run_id = excluded.run_id",
            params![
                record.url,
                record.crawl_timestamp.to_rfc3339(),
                record.parse_timestamp.to_rfc3339(),
                record.thumbnail_url,
                record.referrer_url,
                record.address,
                record.city,
                record.state,
                record.zipcode,
                record.latitude,
                record.longitude,
                record.price,
                record.sqft,
                record.bedrooms,
                record.bathrooms,
                record.pet_friendly,
                record.furnished,
                self.current_run,
            ],
        )?;
        Ok(())
    }

    fn get_listing(&self, url: &str) -> StorageResult<Option<ListingRecord>> {
        let listing = self
            .conn
            .query_row(
                &format!("SELECT {} FROM listings WHERE url = ?1", LISTING_COLUMNS),
                params![url],
                listing_from_row,
            )
            .optional()?;
        Ok(listing)
    }

    fn count_listings(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM listings", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

impl ListingSink for SqliteListingStore {
    fn accept(&mut self, record: &ListingRecord) -> StorageResult<()> {
        self.upsert_listing(record)
    }
}

/// Opens the database at `path`, creating the schema if needed
pub fn init_database(path: &Path) -> Result<SqliteListingStore, HarvestError> {
    SqliteListingStore::new(path)
}
