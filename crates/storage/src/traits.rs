//! Storage traits for pluggable storage implementations

// Re-export the storage traits from types crate
pub use vitals_types::storage::{
	MetricStorageTrait as MetricStorage, StorageError, StorageResult, StorageStats,
	StorageTrait as Storage,
};
