//! Geolocation Client Port
//!
//! Defines the interface for fetching geolocation data from the upstream
//! provider. Implementations may target ipstack or any compatible API.

use crate::domain::entities::GeoData;
use anyhow::Result;
use async_trait::async_trait;

/// Client for the upstream geolocation provider.
///
/// This is an outbound port that abstracts the provider's HTTP API.
/// A failed transport, a non-success status, and an error payload inside
/// a success response are all reported the same way: as an error whose
/// message the engine surfaces to callers.
#[async_trait]
pub trait GeoClient: Send + Sync {
    /// Fetch geolocation data for a single address.
    async fn fetch(&self, ip: &str) -> Result<GeoData>;
}
