pub mod memory;

pub use memory::InMemoryStore;
pub use portal_core::{MappingStore, StorageError};
