//! geo-cache - Cached IP Geolocation API with Hexagonal Architecture
//!
//! This is the composition root that wires together all the components.

mod adapters;
mod application;
mod config;
mod domain;

use crate::adapters::inbound::ApiServer;
use crate::adapters::outbound::{IpstackClient, MemoryRecordStore, SqliteRecordStore};
use crate::application::IpService;
use crate::config::load_config;
use crate::domain::ports::{GeoClient, RecordStore};
use std::sync::Arc;
use tracing_subscriber::fmt::format::FmtSpan;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment
    let cfg = load_config()?;

    // Setup logging
    let log_level = if cfg.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_span_events(FmtSpan::CLOSE)
        .init();

    tracing::info!("starting geo-cache listen={}", cfg.listen_addr);

    // ===== COMPOSITION ROOT =====
    // Wire up all adapters and services

    // 1. Create outbound adapters

    // Record store (SQLite when a path is configured, in-memory otherwise)
    let store: Arc<dyn RecordStore> = match &cfg.db_path {
        Some(path) => {
            let store = SqliteRecordStore::open(path)?;
            tracing::info!("using SQLite record store at {}", path);
            Arc::new(store)
        }
        None => {
            tracing::info!("no GEOCACHE_DB_PATH set, using in-memory record store");
            Arc::new(MemoryRecordStore::new())
        }
    };

    // Upstream geolocation client (ipstack)
    if cfg.ipstack_api_key.is_empty() {
        tracing::warn!("IPSTACK_API_KEY is empty, upstream lookups will fail");
    }
    let client: Arc<dyn GeoClient> = Arc::new(IpstackClient::new(
        &cfg.ipstack_base_url,
        &cfg.ipstack_api_key,
        cfg.ipstack_timeout_ms,
    )?);

    // 2. Create application service
    let service = Arc::new(IpService::new(store, client));

    // 3. Create inbound adapter and run
    let server = ApiServer::new(cfg.listen_addr, service);

    server.run().await
}
