mod geo_client;
mod record_store;

pub use geo_client::GeoClient;
pub use record_store::RecordStore;
