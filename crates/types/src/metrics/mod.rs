//! Core metric domain model

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
#[cfg(feature = "openapi")]
use utoipa::ToSchema;

pub mod errors;
pub mod fingerprint;
pub mod request;
pub mod response;

pub use errors::{AggregationError, MetricError, MetricResult, MetricValidationError};
pub use fingerprint::compute_fingerprint;
pub use request::{
	BatchStoreMetricsRequest, DeleteRecordRequest, QueryMetricsRequest, StoreMetricRequest,
	TrendSummaryRequest,
};
pub use response::{
	BatchStoreMetricsResponse, DeleteRecordResponse, MetricRecordView, MetricTypesResponse,
	QueryMetricsResponse, StoreMetricResponse,
};

/// Observed value of a metric sample. Exactly one shape per record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
	Number(f64),
	Text(String),
	Structured(Map<String, Value>),
}

impl MetricValue {
	pub fn as_number(&self) -> Option<f64> {
		match self {
			MetricValue::Number(n) => Some(*n),
			_ => None,
		}
	}

	pub fn as_text(&self) -> Option<&str> {
		match self {
			MetricValue::Text(s) => Some(s),
			_ => None,
		}
	}

	pub fn as_structured(&self) -> Option<&Map<String, Value>> {
		match self {
			MetricValue::Structured(map) => Some(map),
			_ => None,
		}
	}
}

impl TryFrom<Value> for MetricValue {
	type Error = MetricValidationError;

	fn try_from(value: Value) -> Result<Self, Self::Error> {
		match value {
			Value::Number(n) => n.as_f64().map(MetricValue::Number).ok_or_else(|| {
				MetricValidationError::UnsupportedValueType {
					kind: format!("number {}", n),
				}
			}),
			Value::String(s) => Ok(MetricValue::Text(s)),
			Value::Object(map) => Ok(MetricValue::Structured(map)),
			Value::Null => Err(MetricValidationError::UnsupportedValueType {
				kind: "null".to_string(),
			}),
			Value::Bool(_) => Err(MetricValidationError::UnsupportedValueType {
				kind: "boolean".to_string(),
			}),
			Value::Array(_) => Err(MetricValidationError::UnsupportedValueType {
				kind: "array".to_string(),
			}),
		}
	}
}

/// Parse an ISO-8601 timestamp into UTC.
///
/// Accepts RFC 3339 with an offset, a naive date-time (`T` or space
/// separated, optional fraction) taken as UTC, or a bare date at midnight UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, MetricValidationError> {
	let trimmed = raw.trim();

	if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
		return Ok(ts.with_timezone(&Utc));
	}
	for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
		if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
			return Ok(naive.and_utc());
		}
	}
	if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
		if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
			return Ok(midnight.and_utc());
		}
	}

	Err(MetricValidationError::InvalidTimestamp {
		value: raw.to_string(),
	})
}

/// Validated ingestion input, before an id and fingerprint are assigned
#[derive(Debug, Clone, PartialEq)]
pub struct NewMetric {
	pub user_id: String,
	pub type_code: String,
	pub value: MetricValue,
	pub unit: Option<String>,
	pub recorded_at: DateTime<Utc>,
	pub source: String,
	pub metadata: Option<Map<String, Value>>,
	pub tags: Option<Map<String, Value>>,
}

/// A stored metric sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
	pub id: String,
	pub user_id: String,
	pub type_code: String,
	pub value: MetricValue,
	pub unit: Option<String>,
	pub recorded_at: DateTime<Utc>,
	pub source: String,
	pub metadata: Option<Map<String, Value>>,
	pub tags: Option<Map<String, Value>>,
	pub dedup_fingerprint: String,
	pub deleted: bool,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl MetricRecord {
	/// Build a live record with a fresh id and its dedup fingerprint
	pub fn new(input: NewMetric) -> Self {
		let dedup_fingerprint = compute_fingerprint(
			&input.user_id,
			&input.type_code,
			&input.recorded_at,
			&input.value,
			input.metadata.as_ref(),
		);
		let now = Utc::now();

		Self {
			id: uuid::Uuid::new_v4().to_string(),
			user_id: input.user_id,
			type_code: input.type_code,
			value: input.value,
			unit: input.unit,
			recorded_at: input.recorded_at,
			source: input.source,
			metadata: input.metadata,
			tags: input.tags,
			dedup_fingerprint,
			deleted: false,
			created_at: now,
			updated_at: now,
		}
	}

	pub fn is_live(&self) -> bool {
		!self.deleted
	}

	/// Flip the soft-delete flag. Returns false if already deleted.
	pub fn mark_deleted(&mut self) -> bool {
		if self.deleted {
			return false;
		}
		self.deleted = true;
		self.updated_at = Utc::now();
		true
	}
}

/// Sort direction on `recorded_at`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
	Asc,
	#[default]
	Desc,
}

impl FromStr for SortOrder {
	type Err = MetricValidationError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"asc" => Ok(SortOrder::Asc),
			"desc" => Ok(SortOrder::Desc),
			other => Err(MetricValidationError::InvalidOrder {
				value: other.to_string(),
			}),
		}
	}
}

/// Calendar bucket used by trend aggregation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
	Day,
	#[default]
	Week,
	Month,
}

impl FromStr for GroupBy {
	type Err = MetricValidationError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"day" => Ok(GroupBy::Day),
			"week" => Ok(GroupBy::Week),
			"month" => Ok(GroupBy::Month),
			other => Err(MetricValidationError::InvalidGroupBy {
				value: other.to_string(),
			}),
		}
	}
}

impl fmt::Display for GroupBy {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			GroupBy::Day => write!(f, "day"),
			GroupBy::Week => write!(f, "week"),
			GroupBy::Month => write!(f, "month"),
		}
	}
}

/// Resolved query against live records. Every `Some` predicate must hold.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricQuery {
	pub user_id: String,
	pub type_code: Option<String>,
	pub limit: usize,
	pub order: SortOrder,
	pub start_time: Option<DateTime<Utc>>,
	pub end_time: Option<DateTime<Utc>>,
	pub source: Option<String>,
}

impl MetricQuery {
	pub fn for_user(user_id: impl Into<String>) -> Self {
		Self {
			user_id: user_id.into(),
			type_code: None,
			limit: 20,
			order: SortOrder::Desc,
			start_time: None,
			end_time: None,
			source: None,
		}
	}

	/// Whether a record passes every predicate (liveness included)
	pub fn matches(&self, record: &MetricRecord) -> bool {
		record.is_live()
			&& record.user_id == self.user_id
			&& self
				.type_code
				.as_ref()
				.map_or(true, |code| &record.type_code == code)
			&& self.start_time.map_or(true, |start| record.recorded_at >= start)
			&& self.end_time.map_or(true, |end| record.recorded_at <= end)
			&& self
				.source
				.as_ref()
				.map_or(true, |source| &record.source == source)
	}
}

/// One calendar bucket of a trend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct TrendPoint {
	pub time_bucket: String,
	pub average: f64,
	pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct TrendStats {
	pub slope: f64,
	pub count: usize,
}

/// Bucketed averages plus a linear trend estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct TrendSummary {
	pub points: Vec<TrendPoint>,
	pub stats: TrendStats,
}

impl TrendSummary {
	pub fn empty() -> Self {
		Self {
			points: Vec::new(),
			stats: TrendStats {
				slope: 0.0,
				count: 0,
			},
		}
	}
}
