//! Domain Entities - Core business objects
//!
//! These entities represent the core concepts of the geo-cache domain.
//! They have no external dependencies and contain only business logic.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A cached geolocation record for one IP address.
///
/// There is at most one record per address. A record is created on the
/// first successful upstream lookup, overwritten in place on every
/// refresh, and removed on explicit eviction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpRecord {
    /// The IP address literal, exactly as the caller supplied it
    pub ip: String,
    /// Country name reported by the upstream provider
    pub country: Option<String>,
    /// City reported by the upstream provider
    pub city: Option<String>,
    /// Latitude reported by the upstream provider
    pub latitude: Option<f64>,
    /// Longitude reported by the upstream provider
    pub longitude: Option<f64>,
    /// When the record was last refreshed from upstream
    pub updated_at: DateTime<Utc>,
}

impl IpRecord {
    /// Check whether this record is older than `max_age` at time `now`.
    ///
    /// The comparison is inclusive: a record whose age equals `max_age`
    /// exactly is still considered fresh.
    pub fn is_stale(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        now - self.updated_at > max_age
    }
}

/// A deny-list entry blocking lookups for one IP address.
///
/// Lives independently of any [`IpRecord`]: removing either never removes
/// the other. `record_ip` is an informational back-reference set at
/// add-time when a cached record already exists for the same address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlacklistEntry {
    /// The blocked IP address literal
    pub ip: String,
    /// Key of the cached record for this address, if one existed when
    /// the entry was created
    pub record_ip: Option<String>,
}

/// Geolocation fields returned by the upstream provider for one address.
///
/// Every field is optional; the provider omits fields it cannot resolve.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeoData {
    pub country: Option<String>,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}
