//! Ipstack Geolocation Client
//!
//! Implements GeoClient against the ipstack HTTP API (or any endpoint
//! speaking the same format). ipstack reports errors inside a 200
//! response body, so both transport failures and error payloads are
//! surfaced as errors here.

use crate::domain::entities::GeoData;
use crate::domain::ports::GeoClient;
use anyhow::{bail, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

/// Response payload from the ipstack API.
///
/// Only the fields the cache persists are deserialized; everything else
/// in the payload is ignored.
#[derive(Debug, Deserialize)]
struct IpstackResponse {
    #[serde(default)]
    country_name: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    latitude: Option<f64>,
    #[serde(default)]
    longitude: Option<f64>,
    #[serde(default)]
    error: Option<IpstackError>,
}

/// Error object ipstack embeds in a success-status response.
#[derive(Debug, Deserialize)]
struct IpstackError {
    #[serde(default)]
    info: Option<String>,
}

/// HTTP client for the ipstack geolocation API.
pub struct IpstackClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl IpstackClient {
    /// Create a new client. Requests time out after `timeout_ms`.
    pub fn new(base_url: &str, api_key: &str, timeout_ms: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }
}

#[async_trait]
impl GeoClient for IpstackClient {
    async fn fetch(&self, ip: &str) -> Result<GeoData> {
        let url = format!("{}/{}", self.base_url, ip);

        let response = self
            .client
            .get(&url)
            .query(&[("access_key", self.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            bail!("Failed to fetch IP data from ipstack");
        }

        let body: IpstackResponse = response.json().await?;

        if let Some(error) = body.error {
            bail!(error.info.unwrap_or_else(|| "ipstack error".to_string()));
        }

        Ok(GeoData {
            country: body.country_name,
            city: body.city,
            latitude: body.latitude,
            longitude: body.longitude,
        })
    }
}
