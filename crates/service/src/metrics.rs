//! Metric service
//!
//! Ingestion with deduplication, queries, soft-delete, catalog listing and
//! trend summaries over a pluggable storage backend.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tracing::{debug, info};
use vitals_storage::{Storage, StorageError, StorageStats};
use vitals_types::catalog::{self, MetricType};
use vitals_types::{
	GroupBy, MetricError, MetricQuery, MetricRecord, MetricResult, MetricValidationError,
	QueryMetricsRequest, SortOrder, StoreMetricRequest, TrendSummary, TrendSummaryRequest,
};

use crate::trend;

/// Page size bounds applied to queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryLimits {
	pub default_limit: usize,
	pub max_limit: usize,
}

impl Default for QueryLimits {
	fn default() -> Self {
		Self {
			default_limit: 20,
			max_limit: 100,
		}
	}
}

impl QueryLimits {
	pub fn resolve(&self, requested: Option<usize>) -> usize {
		requested
			.unwrap_or(self.default_limit)
			.clamp(1, self.max_limit.max(1))
	}
}

/// Trait for metric service operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetricServiceTrait: Send + Sync {
	/// Store one sample. Returns the stored record and whether an existing
	/// live record was returned instead of a new one.
	async fn store(&self, request: StoreMetricRequest) -> MetricResult<(MetricRecord, bool)>;

	/// Store samples in order; the first failure aborts the remainder
	async fn batch_store(
		&self,
		requests: Vec<StoreMetricRequest>,
	) -> MetricResult<Vec<(MetricRecord, bool)>>;

	/// Live records for a user matching the request filters
	async fn query(&self, request: QueryMetricsRequest) -> MetricResult<Vec<MetricRecord>>;

	/// Soft-delete a record owned by `user_id`
	async fn delete(&self, user_id: &str, record_id: &str) -> MetricResult<bool>;

	/// Bucketed trend over a user's live records of one type
	async fn trend_summary(&self, request: TrendSummaryRequest) -> MetricResult<TrendSummary>;

	/// Catalog entries
	fn list_types(&self) -> Vec<MetricType>;

	async fn health_check(&self) -> MetricResult<bool>;

	async fn stats(&self) -> MetricResult<StorageStats>;
}

#[derive(Clone)]
pub struct MetricService {
	storage: Arc<dyn Storage>,
	limits: QueryLimits,
}

impl MetricService {
	pub fn new(storage: Arc<dyn Storage>) -> Self {
		Self {
			storage,
			limits: QueryLimits::default(),
		}
	}

	pub fn with_limits(mut self, limits: QueryLimits) -> Self {
		self.limits = limits;
		self
	}

	pub fn limits(&self) -> QueryLimits {
		self.limits
	}

	fn require(field: &str, value: &str) -> Result<(), MetricValidationError> {
		if value.trim().is_empty() {
			return Err(MetricValidationError::MissingRequiredField {
				field: field.to_string(),
			});
		}
		Ok(())
	}
}

#[async_trait]
impl MetricServiceTrait for MetricService {
	async fn store(&self, request: StoreMetricRequest) -> MetricResult<(MetricRecord, bool)> {
		Self::require("user_id", &request.user_id)?;
		Self::require("type", &request.type_code)?;

		let mut input = request.into_new_metric()?;
		if input.unit.is_none() {
			input.unit = catalog::default_unit(&input.type_code).map(str::to_string);
		}
		let record = MetricRecord::new(input);

		match self.storage.insert_metric(record).await {
			Ok(stored) => Ok((stored, false)),
			Err(StorageError::Conflict {
				user_id,
				fingerprint,
			}) => {
				let existing = self
					.storage
					.find_live_by_fingerprint(&user_id, &fingerprint)
					.await?
					.ok_or_else(|| {
						MetricError::Storage(format!(
							"live record for fingerprint {} vanished after conflict",
							fingerprint
						))
					})?;
				debug!(
					"Duplicate submission for user {} resolved to record {}",
					user_id, existing.id
				);
				Ok((existing, true))
			},
			Err(e) => Err(e.into()),
		}
	}

	async fn batch_store(
		&self,
		requests: Vec<StoreMetricRequest>,
	) -> MetricResult<Vec<(MetricRecord, bool)>> {
		let total = requests.len();
		let mut stored = Vec::with_capacity(total);
		for request in requests {
			stored.push(self.store(request).await?);
		}
		info!("Batch stored {} metric records", total);
		Ok(stored)
	}

	async fn query(&self, request: QueryMetricsRequest) -> MetricResult<Vec<MetricRecord>> {
		Self::require("user_id", &request.user_id)?;

		let order = match request.order.as_deref() {
			Some(raw) => raw.parse::<SortOrder>()?,
			None => SortOrder::default(),
		};
		let query = MetricQuery {
			start_time: request.parsed_start_time()?,
			end_time: request.parsed_end_time()?,
			limit: self.limits.resolve(request.limit),
			order,
			user_id: request.user_id,
			type_code: request.type_code,
			source: request.source,
		};

		Ok(self.storage.query_metrics(&query).await?)
	}

	async fn delete(&self, user_id: &str, record_id: &str) -> MetricResult<bool> {
		let deleted = self.storage.soft_delete_metric(user_id, record_id).await?;
		if deleted {
			info!("Deleted metric {} for user {}", record_id, user_id);
		}
		Ok(deleted)
	}

	async fn trend_summary(&self, request: TrendSummaryRequest) -> MetricResult<TrendSummary> {
		Self::require("user_id", &request.user_id)?;
		Self::require("type", &request.type_code)?;

		let group_by = match request.group_by.as_deref() {
			Some(raw) => raw.parse::<GroupBy>()?,
			None => GroupBy::default(),
		};
		// A window reaching past the representable range has no lower bound
		let since = request
			.lookback_days
			.filter(|days| *days > 0)
			.and_then(|days| Duration::try_days(i64::from(days)))
			.and_then(|window| Utc::now().checked_sub_signed(window));

		let records = self
			.storage
			.list_for_trend(&request.user_id, &request.type_code, since)
			.await?;

		Ok(trend::summarize(
			&records,
			request.metric_field.as_deref(),
			group_by,
		)?)
	}

	fn list_types(&self) -> Vec<MetricType> {
		catalog::list_metric_types().to_vec()
	}

	async fn health_check(&self) -> MetricResult<bool> {
		Ok(self.storage.health_check().await?)
	}

	async fn stats(&self) -> MetricResult<StorageStats> {
		Ok(self.storage.stats().await?)
	}
}
