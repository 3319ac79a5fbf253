//! In-Memory Record Store
//!
//! Implements RecordStore using DashMap. Used when no database path is
//! configured and as a lightweight store in tests.

use crate::domain::entities::{BlacklistEntry, IpRecord};
use crate::domain::ports::RecordStore;
use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;

/// DashMap-backed record store. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryRecordStore {
    records: DashMap<String, IpRecord>,
    blacklist: DashMap<String, BlacklistEntry>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn find_record(&self, ip: &str) -> Result<Option<IpRecord>> {
        Ok(self.records.get(ip).map(|r| r.value().clone()))
    }

    async fn upsert_record(&self, record: &IpRecord) -> Result<()> {
        self.records.insert(record.ip.clone(), record.clone());
        Ok(())
    }

    async fn delete_record(&self, ip: &str) -> Result<()> {
        self.records.remove(ip);
        Ok(())
    }

    async fn find_blacklist_entry(&self, ip: &str) -> Result<Option<BlacklistEntry>> {
        Ok(self.blacklist.get(ip).map(|e| e.value().clone()))
    }

    async fn insert_blacklist_entry(&self, entry: &BlacklistEntry) -> Result<()> {
        self.blacklist.insert(entry.ip.clone(), entry.clone());
        Ok(())
    }

    async fn delete_blacklist_entry(&self, ip: &str) -> Result<()> {
        self.blacklist.remove(ip);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn test_record_roundtrip() {
        let store = MemoryRecordStore::new();
        let record = IpRecord {
            ip: "8.8.8.8".to_string(),
            country: None,
            city: None,
            latitude: None,
            longitude: None,
            updated_at: Utc::now(),
        };

        store.upsert_record(&record).await.unwrap();
        assert_eq!(store.find_record("8.8.8.8").await.unwrap(), Some(record));

        store.delete_record("8.8.8.8").await.unwrap();
        assert!(store.find_record("8.8.8.8").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_blacklist_roundtrip() {
        let store = MemoryRecordStore::new();
        let entry = BlacklistEntry {
            ip: "1.1.1.1".to_string(),
            record_ip: None,
        };

        store.insert_blacklist_entry(&entry).await.unwrap();
        assert_eq!(
            store.find_blacklist_entry("1.1.1.1").await.unwrap(),
            Some(entry)
        );

        store.delete_blacklist_entry("1.1.1.1").await.unwrap();
        assert!(store
            .find_blacklist_entry("1.1.1.1")
            .await
            .unwrap()
            .is_none());
    }
}
