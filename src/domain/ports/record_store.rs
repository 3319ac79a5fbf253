//! Record Store Port
//!
//! Defines the interface for persisting cached IP records and deny-list
//! entries. Implementations may use SQLite, in-memory maps, or other
//! storage.

use crate::domain::entities::{BlacklistEntry, IpRecord};
use anyhow::Result;
use async_trait::async_trait;

/// Persistence for cached lookup records and deny-list entries.
///
/// This is an outbound port that abstracts the storage mechanism. All
/// operations are keyed by exact address-string equality; the store
/// performs no normalization. Each single-record operation is atomic
/// from the store's perspective, but the port offers no cross-call
/// transactionality.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Find the cached record for an address, if any.
    async fn find_record(&self, ip: &str) -> Result<Option<IpRecord>>;

    /// Insert or overwrite the cached record for `record.ip`.
    async fn upsert_record(&self, record: &IpRecord) -> Result<()>;

    /// Delete the cached record for an address. No-op if absent.
    async fn delete_record(&self, ip: &str) -> Result<()>;

    /// Find the deny-list entry for an address, if any.
    async fn find_blacklist_entry(&self, ip: &str) -> Result<Option<BlacklistEntry>>;

    /// Insert a deny-list entry keyed by `entry.ip`.
    async fn insert_blacklist_entry(&self, entry: &BlacklistEntry) -> Result<()>;

    /// Delete the deny-list entry for an address. No-op if absent.
    async fn delete_blacklist_entry(&self, ip: &str) -> Result<()>;
}
