//! Vitals Storage
//!
//! Storage implementations for Vitals Hub metric records.

pub mod memory_store;
pub mod traits;

pub use memory_store::MemoryStore;
pub use traits::{MetricStorage, Storage, StorageError, StorageResult, StorageStats};
