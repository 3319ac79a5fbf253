//! IP Service - Main application use case
//!
//! Orchestrates the lookup logic: address validation, deny-list checks,
//! cache freshness, upstream refreshes and bulk fan-out. This is the
//! primary interface for the inbound adapter.

use crate::domain::address;
use crate::domain::entities::{BlacklistEntry, IpRecord};
use crate::domain::errors::IpServiceError;
use crate::domain::ports::{GeoClient, RecordStore};
use chrono::{Duration, Utc};
use std::sync::Arc;

/// How long a cached record stays fresh. A record exactly this old is
/// still served from cache; anything older triggers a refresh.
const FRESHNESS_WINDOW_HOURS: i64 = 24;

/// Outcome of one item in a bulk operation.
///
/// Bulk operations never abort the batch: each input address produces
/// exactly one item, in input order, carrying either the payload or the
/// error for that address.
#[derive(Debug)]
pub struct BulkItem<T> {
    /// The address as it appeared in the input list
    pub ip: String,
    /// Per-item outcome
    pub result: Result<T, IpServiceError>,
}

/// IP lookup service - main application use case.
///
/// This service orchestrates the lookup/blacklist logic:
/// 1. Validates address literals before any store or network access
/// 2. Refuses lookups for blacklisted addresses
/// 3. Serves cached records while fresh, refreshing from upstream otherwise
/// 4. Manages the deny list and cache eviction
pub struct IpService {
    store: Arc<dyn RecordStore>,
    client: Arc<dyn GeoClient>,
}

impl IpService {
    /// Create a new IP service.
    pub fn new(store: Arc<dyn RecordStore>, client: Arc<dyn GeoClient>) -> Self {
        Self { store, client }
    }

    /// Look up geolocation data for a single address.
    ///
    /// Returns the cached record when it is younger than the freshness
    /// window, otherwise refreshes it from the upstream provider. The
    /// concurrent-refresh race is accepted: two callers may both see a
    /// stale record and both call upstream; the last write wins.
    pub async fn lookup(&self, ip: &str) -> Result<IpRecord, IpServiceError> {
        address::validate(ip)?;

        // 1. Deny-list short-circuit: no cache or network access
        if self.store.find_blacklist_entry(ip).await?.is_some() {
            tracing::debug!("lookup refused, {} is blacklisted", ip);
            return Err(IpServiceError::Blacklisted);
        }

        // 2. Serve from cache while fresh
        let existing = self.store.find_record(ip).await?;
        let now = Utc::now();

        if let Some(record) = &existing {
            if !record.is_stale(now, Duration::hours(FRESHNESS_WINDOW_HOURS)) {
                tracing::debug!("cache hit for {}", ip);
                return Ok(record.clone());
            }
        }

        // 3. Refresh from upstream; nothing is persisted on failure
        let data = self.client.fetch(ip).await.map_err(|e| {
            tracing::warn!("upstream lookup failed for {}: {}", ip, e);
            IpServiceError::Upstream(e.to_string())
        })?;

        let record = IpRecord {
            ip: ip.to_string(),
            country: data.country,
            city: data.city,
            latitude: data.latitude,
            longitude: data.longitude,
            updated_at: now,
        };

        self.store.upsert_record(&record).await?;
        tracing::debug!("refreshed record for {}", ip);

        Ok(record)
    }

    /// Look up many addresses, one independent outcome per input element.
    ///
    /// Items are processed sequentially in input order; duplicates are
    /// processed independently, each observing the state left by earlier
    /// items. One item's failure never aborts the batch.
    pub async fn lookup_many(&self, ips: &[String]) -> Vec<BulkItem<IpRecord>> {
        let mut results = Vec::with_capacity(ips.len());
        for ip in ips {
            results.push(BulkItem {
                ip: ip.clone(),
                result: self.lookup(ip).await,
            });
        }
        results
    }

    /// Delete the cached record for an address.
    ///
    /// Never touches the deny list and never calls upstream.
    pub async fn evict(&self, ip: &str) -> Result<(), IpServiceError> {
        address::validate(ip)?;

        if self.store.find_record(ip).await?.is_none() {
            return Err(IpServiceError::NotFound);
        }

        self.store.delete_record(ip).await?;
        tracing::debug!("evicted cached record for {}", ip);

        Ok(())
    }

    /// Add an address to the deny list. Idempotent.
    ///
    /// If a cached record already exists for the address, the new entry
    /// carries an informational back-reference to it.
    pub async fn block(&self, ip: &str) -> Result<(), IpServiceError> {
        address::validate(ip)?;

        // Already blocked: nothing to do
        if self.store.find_blacklist_entry(ip).await?.is_some() {
            return Ok(());
        }

        let record_ip = self.store.find_record(ip).await?.map(|r| r.ip);

        let entry = BlacklistEntry {
            ip: ip.to_string(),
            record_ip,
        };

        self.store.insert_blacklist_entry(&entry).await?;
        tracing::debug!("blacklisted {}", ip);

        Ok(())
    }

    /// Add many addresses to the deny list, one outcome per input element.
    pub async fn block_many(&self, ips: &[String]) -> Vec<BulkItem<()>> {
        let mut results = Vec::with_capacity(ips.len());
        for ip in ips {
            results.push(BulkItem {
                ip: ip.clone(),
                result: self.block(ip).await,
            });
        }
        results
    }

    /// Remove an address from the deny list.
    pub async fn unblock(&self, ip: &str) -> Result<(), IpServiceError> {
        address::validate(ip)?;

        if self.store.find_blacklist_entry(ip).await?.is_none() {
            return Err(IpServiceError::NotBlacklisted);
        }

        self.store.delete_blacklist_entry(ip).await?;
        tracing::debug!("removed {} from blacklist", ip);

        Ok(())
    }

    /// Remove many addresses from the deny list, one outcome per input
    /// element.
    pub async fn unblock_many(&self, ips: &[String]) -> Vec<BulkItem<()>> {
        let mut results = Vec::with_capacity(ips.len());
        for ip in ips {
            results.push(BulkItem {
                ip: ip.clone(),
                result: self.unblock(ip).await,
            });
        }
        results
    }
}
