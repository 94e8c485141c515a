//! Key-value storage for the hero catalog.
//!
//! The hero store keeps one JSON snapshot under a single key. Backends:
//! [`MemoryKV`] for tests and [`RedbStore`] for a durable file.

pub mod error;
pub mod memory;
pub mod redb;
pub mod traits;

pub use error::KVError;
pub use memory::MemoryKV;
pub use redb::RedbStore;
pub use traits::KVStore;
