//! geo-cache Library
//!
//! This module exposes the geo-cache components for use in integration
//! tests and as a library.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;

// Re-export commonly used types
pub use adapters::inbound::ApiServer;
pub use adapters::outbound::{IpstackClient, MemoryRecordStore, SqliteRecordStore};
pub use application::{BulkItem, IpService};
pub use config::load_config;
pub use domain::entities::{BlacklistEntry, GeoData, IpRecord};
pub use domain::errors::IpServiceError;
pub use domain::ports::{GeoClient, RecordStore};
