//! Outbound payloads shared by the REST and tool-call surfaces

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use super::{MetricRecord, MetricValue};
use crate::catalog::MetricType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct StoreMetricResponse {
	pub record_id: String,
	pub deduplicated: bool,
}

impl From<(MetricRecord, bool)> for StoreMetricResponse {
	fn from((record, deduplicated): (MetricRecord, bool)) -> Self {
		Self {
			record_id: record.id,
			deduplicated,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct BatchStoreMetricsResponse {
	pub records: Vec<StoreMetricResponse>,
}

/// Flattened record as returned by queries: the value is split over three
/// nullable slots, exactly one of which is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct MetricRecordView {
	pub record_id: String,
	pub user_id: String,
	#[serde(rename = "type")]
	pub type_code: String,
	pub value_number: Option<f64>,
	pub value_text: Option<String>,
	#[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
	pub value: Option<Map<String, Value>>,
	pub recorded_at: DateTime<Utc>,
	pub source: String,
	pub unit: Option<String>,
	#[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
	pub metadata: Option<Map<String, Value>>,
	#[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
	pub tags: Option<Map<String, Value>>,
	pub deleted: bool,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl From<&MetricRecord> for MetricRecordView {
	fn from(record: &MetricRecord) -> Self {
		let (value_number, value_text, value) = match &record.value {
			MetricValue::Number(n) => (Some(*n), None, None),
			MetricValue::Text(s) => (None, Some(s.clone()), None),
			MetricValue::Structured(map) => (None, None, Some(map.clone())),
		};

		Self {
			record_id: record.id.clone(),
			user_id: record.user_id.clone(),
			type_code: record.type_code.clone(),
			value_number,
			value_text,
			value,
			recorded_at: record.recorded_at,
			source: record.source.clone(),
			unit: record.unit.clone(),
			metadata: record.metadata.clone(),
			tags: record.tags.clone(),
			deleted: record.deleted,
			created_at: record.created_at,
			updated_at: record.updated_at,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct QueryMetricsResponse {
	pub records: Vec<MetricRecordView>,
}

impl From<Vec<MetricRecord>> for QueryMetricsResponse {
	fn from(records: Vec<MetricRecord>) -> Self {
		Self {
			records: records.iter().map(MetricRecordView::from).collect(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct DeleteRecordResponse {
	pub success: bool,
	pub message: Option<String>,
}

impl DeleteRecordResponse {
	pub fn from_outcome(deleted: bool) -> Self {
		if deleted {
			Self {
				success: true,
				message: None,
			}
		} else {
			Self {
				success: false,
				message: Some("record not found".to_string()),
			}
		}
	}
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct MetricTypesResponse {
	pub types: Vec<MetricType>,
}
