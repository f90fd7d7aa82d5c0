mod catalog;
mod memory;
mod persistence;

pub use catalog::{Catalog, RecordStore, SchemaProvider};
pub use memory::MemoryStore;
pub use persistence::StoreSnapshot;
