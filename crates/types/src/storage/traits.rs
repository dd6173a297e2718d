//! Storage traits for pluggable storage implementations

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use super::StorageResult;
use crate::metrics::{MetricQuery, MetricRecord};

/// Statistics about storage usage
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct StorageStats {
	pub total_records: usize,
	pub live_records: usize,
	pub distinct_users: usize,
	/// Live record count per type code
	pub live_by_type: BTreeMap<String, usize>,
}

/// Trait for metric record storage operations
#[async_trait]
pub trait MetricStorageTrait: Send + Sync {
	/// Insert a new live record.
	///
	/// Fails with `StorageError::Conflict` when a live record with the same
	/// `(user_id, dedup_fingerprint)` already exists. The check and the
	/// insert are atomic.
	async fn insert_metric(&self, record: MetricRecord) -> StorageResult<MetricRecord>;

	/// Find the live record holding a fingerprint for a user
	async fn find_live_by_fingerprint(
		&self,
		user_id: &str,
		fingerprint: &str,
	) -> StorageResult<Option<MetricRecord>>;

	/// Get a record by ID, deleted or not
	async fn get_metric(&self, record_id: &str) -> StorageResult<Option<MetricRecord>>;

	/// Live records matching a query, ordered and limited
	async fn query_metrics(&self, query: &MetricQuery) -> StorageResult<Vec<MetricRecord>>;

	/// Soft-delete a live record owned by `user_id`.
	///
	/// Returns false when the record is missing, owned by someone else or
	/// already deleted.
	async fn soft_delete_metric(&self, user_id: &str, record_id: &str) -> StorageResult<bool>;

	/// Live records of one type for a user, ascending by `recorded_at`,
	/// optionally restricted to `recorded_at >= since`
	async fn list_for_trend(
		&self,
		user_id: &str,
		type_code: &str,
		since: Option<DateTime<Utc>>,
	) -> StorageResult<Vec<MetricRecord>>;
}

/// Main storage trait that combines all storage operations
#[async_trait]
pub trait StorageTrait: MetricStorageTrait {
	/// Health check for the storage system
	async fn health_check(&self) -> StorageResult<bool>;

	/// Get overall storage statistics
	async fn stats(&self) -> StorageResult<StorageStats>;

	/// Close the storage connection
	async fn close(&self) -> StorageResult<()>;
}
