mod ip_service;

pub use ip_service::{BulkItem, IpService};
