//! Inbound payloads shared by the REST and tool-call surfaces

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use super::{parse_timestamp, MetricValidationError, MetricValue, NewMetric};

fn default_source() -> String {
	"unknown".to_string()
}

/// Single metric submission
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct StoreMetricRequest {
	pub user_id: String,
	#[serde(rename = "type")]
	pub type_code: String,
	#[cfg_attr(feature = "openapi", schema(value_type = Object))]
	#[serde(default)]
	pub value: Value,
	#[serde(default)]
	pub unit: Option<String>,
	#[serde(default)]
	pub recorded_at: Option<String>,
	#[serde(default = "default_source")]
	pub source: String,
	#[serde(default)]
	#[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
	pub metadata: Option<Map<String, Value>>,
	#[serde(default)]
	#[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
	pub tags: Option<Map<String, Value>>,
}

impl StoreMetricRequest {
	/// Type the value and resolve the timestamp. Unit resolution is left to
	/// the service so the catalog lookup happens in one place.
	pub fn into_new_metric(self) -> Result<NewMetric, MetricValidationError> {
		let value = MetricValue::try_from(self.value)?;
		let recorded_at = match self.recorded_at.as_deref() {
			Some(raw) => parse_timestamp(raw)?,
			None => Utc::now(),
		};

		Ok(NewMetric {
			user_id: self.user_id,
			type_code: self.type_code,
			value,
			unit: self.unit,
			recorded_at,
			source: self.source,
			metadata: self.metadata,
			tags: self.tags,
		})
	}
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct BatchStoreMetricsRequest {
	#[serde(default)]
	pub records: Vec<StoreMetricRequest>,
}

/// Query filters as they arrive on the wire
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct QueryMetricsRequest {
	pub user_id: String,
	#[serde(default, rename = "type")]
	pub type_code: Option<String>,
	#[serde(default)]
	pub limit: Option<usize>,
	#[serde(default)]
	pub order: Option<String>,
	#[serde(default)]
	pub start_time: Option<String>,
	#[serde(default)]
	pub end_time: Option<String>,
	#[serde(default)]
	pub source: Option<String>,
}

impl QueryMetricsRequest {
	pub fn parsed_start_time(&self) -> Result<Option<DateTime<Utc>>, MetricValidationError> {
		self.start_time.as_deref().map(parse_timestamp).transpose()
	}

	pub fn parsed_end_time(&self) -> Result<Option<DateTime<Utc>>, MetricValidationError> {
		self.end_time.as_deref().map(parse_timestamp).transpose()
	}
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct TrendSummaryRequest {
	pub user_id: String,
	#[serde(rename = "type")]
	pub type_code: String,
	#[serde(default)]
	pub metric_field: Option<String>,
	#[serde(default)]
	pub group_by: Option<String>,
	#[serde(default)]
	pub lookback_days: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct DeleteRecordRequest {
	pub user_id: String,
	pub record_id: String,
}
