//! Data storage and persistence
//!
//! The ledger only needs a byte-keyed bucket with atomic multi-put
//! commits. `SledStore` is the durable implementation; `MemoryStore`
//! mirrors its semantics in memory and can inject commit failures.

pub mod memory_store;
pub mod sled_store;
pub mod store;

pub use memory_store::MemoryStore;
pub use sled_store::{SledStore, BLOCKS_TREE};
pub use store::{Store, WriteBatch};
