mod ipstack_client;
mod memory_record_store;
mod sqlite_record_store;

pub use ipstack_client::IpstackClient;
pub use memory_record_store::MemoryRecordStore;
pub use sqlite_record_store::SqliteRecordStore;
