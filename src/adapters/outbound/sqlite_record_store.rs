//! SQLite Record Store
//!
//! Implements RecordStore using SQLite for storage. Queries run on the
//! blocking thread pool; the connection is shared behind a mutex.

use crate::domain::entities::{BlacklistEntry, IpRecord};
use crate::domain::ports::RecordStore;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

/// SQLite-backed record store.
///
/// Creates its schema on open. Rows are keyed by the exact address
/// string; timestamps are stored as RFC 3339 text.
pub struct SqliteRecordStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteRecordStore {
    /// Open (or create) the database file and ensure the schema exists.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS ip_records (
                ip          TEXT PRIMARY KEY,
                country     TEXT,
                city        TEXT,
                latitude    REAL,
                longitude   REAL,
                updated_at  TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS blacklisted_ips (
                ip          TEXT PRIMARY KEY,
                record_ip   TEXT
            );",
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a closure against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| anyhow!("sqlite connection mutex poisoned"))?;
            f(&guard)
        })
        .await?
    }

    /// Convert a SQLite row to an IpRecord.
    fn row_to_record(row: &Row) -> rusqlite::Result<IpRecord> {
        let updated_at: String = row.get(5)?;
        let updated_at = DateTime::parse_from_rfc3339(&updated_at)
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    5,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?
            .with_timezone(&Utc);

        Ok(IpRecord {
            ip: row.get(0)?,
            country: row.get(1)?,
            city: row.get(2)?,
            latitude: row.get(3)?,
            longitude: row.get(4)?,
            updated_at,
        })
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn find_record(&self, ip: &str) -> Result<Option<IpRecord>> {
        let ip = ip.to_string();
        self.with_conn(move |conn| {
            let record = conn
                .query_row(
                    "SELECT ip, country, city, latitude, longitude, updated_at
                     FROM ip_records WHERE ip = ?1",
                    params![ip],
                    Self::row_to_record,
                )
                .optional()?;
            Ok(record)
        })
        .await
    }

    async fn upsert_record(&self, record: &IpRecord) -> Result<()> {
        let record = record.clone();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO ip_records (ip, country, city, latitude, longitude, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(ip) DO UPDATE SET
                     country = excluded.country,
                     city = excluded.city,
                     latitude = excluded.latitude,
                     longitude = excluded.longitude,
                     updated_at = excluded.updated_at",
                params![
                    record.ip,
                    record.country,
                    record.city,
                    record.latitude,
                    record.longitude,
                    record.updated_at.to_rfc3339(),
                ],
            )?;
            Ok(())
        })
        .await
    }

    async fn delete_record(&self, ip: &str) -> Result<()> {
        let ip = ip.to_string();
        self.with_conn(move |conn| {
            conn.execute("DELETE FROM ip_records WHERE ip = ?1", params![ip])?;
            Ok(())
        })
        .await
    }

    async fn find_blacklist_entry(&self, ip: &str) -> Result<Option<BlacklistEntry>> {
        let ip = ip.to_string();
        self.with_conn(move |conn| {
            let entry = conn
                .query_row(
                    "SELECT ip, record_ip FROM blacklisted_ips WHERE ip = ?1",
                    params![ip],
                    |row| {
                        Ok(BlacklistEntry {
                            ip: row.get(0)?,
                            record_ip: row.get(1)?,
                        })
                    },
                )
                .optional()?;
            Ok(entry)
        })
        .await
    }

    async fn insert_blacklist_entry(&self, entry: &BlacklistEntry) -> Result<()> {
        let entry = entry.clone();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT OR IGNORE INTO blacklisted_ips (ip, record_ip) VALUES (?1, ?2)",
                params![entry.ip, entry.record_ip],
            )?;
            Ok(())
        })
        .await
    }

    async fn delete_blacklist_entry(&self, ip: &str) -> Result<()> {
        let ip = ip.to_string();
        self.with_conn(move |conn| {
            conn.execute("DELETE FROM blacklisted_ips WHERE ip = ?1", params![ip])?;
            Ok(())
        })
        .await
    }
}
