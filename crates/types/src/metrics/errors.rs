//! Error types for metric operations

use thiserror::Error;

use crate::storage::StorageError;

/// Input that was rejected before touching storage
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetricValidationError {
	#[error("Invalid timestamp: {value} (expected ISO-8601)")]
	InvalidTimestamp { value: String },

	#[error("Unsupported value type: {kind} (expected number, string or object)")]
	UnsupportedValueType { kind: String },

	#[error("order must be 'asc' or 'desc', got '{value}'")]
	InvalidOrder { value: String },

	#[error("group_by must be day/week/month, got '{value}'")]
	InvalidGroupBy { value: String },

	#[error("Missing required field: {field}")]
	MissingRequiredField { field: String },

	#[error("Invalid arguments: {reason}")]
	InvalidArguments { reason: String },
}

/// Failures while turning records into numbers during trend computation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AggregationError {
	#[error("Metric field '{field}' not present in record {record_id}")]
	MissingField { field: String, record_id: String },

	#[error("Cannot extract numeric value for record {record_id}")]
	NonNumericValue { record_id: String },
}

/// Metric operation errors
#[derive(Error, Debug)]
pub enum MetricError {
	#[error("Validation failed: {0}")]
	Validation(#[from] MetricValidationError),

	#[error("Aggregation failed: {0}")]
	Aggregation(#[from] AggregationError),

	#[error("Not found: {resource}")]
	NotFound { resource: String },

	#[error("Storage error: {0}")]
	Storage(String),
}

impl MetricError {
	/// Machine-readable error code shared by every surface
	pub fn code(&self) -> &'static str {
		match self {
			MetricError::Validation(_) => "VALIDATION_ERROR",
			MetricError::Aggregation(_) => "AGGREGATION_ERROR",
			MetricError::NotFound { .. } => "NOT_FOUND",
			MetricError::Storage(_) => "STORAGE_ERROR",
		}
	}
}

impl From<StorageError> for MetricError {
	fn from(err: StorageError) -> Self {
		match err {
			StorageError::NotFound { id } => MetricError::NotFound { resource: id },
			other => MetricError::Storage(other.to_string()),
		}
	}
}

pub type MetricResult<T> = Result<T, MetricError>;
