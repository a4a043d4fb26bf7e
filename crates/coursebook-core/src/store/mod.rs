//! Sled-backed persistence for extensions, relations and unique claims.

mod config;
mod engine;
mod page_index;
mod relation;
mod unique;

pub use config::StoreConfig;
pub use engine::ExtensionStore;
pub use page_index::PageIndex;
pub use relation::{RelationKind, RelationStore};
pub use unique::{Partition, ScopedUniqueIndex};
