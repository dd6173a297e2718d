//! Vitals Types
//!
//! Shared domain models, the metric type catalog, wire formats and the
//! storage traits used by every Vitals Hub crate.

pub mod api_key;
pub mod catalog;
pub mod metrics;
pub mod rpc;
pub mod storage;

// Re-export chrono and serde_json for convenience
pub use chrono;
pub use serde_json;

pub use api_key::ApiKey;

pub use catalog::{get_metric_type, list_metric_types, MetricType, ValueSchema};

pub use metrics::{
	compute_fingerprint, parse_timestamp, AggregationError, BatchStoreMetricsRequest,
	BatchStoreMetricsResponse, DeleteRecordRequest, DeleteRecordResponse, GroupBy, MetricError,
	MetricQuery, MetricRecord, MetricRecordView, MetricResult, MetricTypesResponse,
	MetricValidationError, MetricValue, NewMetric, QueryMetricsRequest, QueryMetricsResponse,
	SortOrder, StoreMetricRequest, StoreMetricResponse, TrendPoint, TrendStats, TrendSummary,
	TrendSummaryRequest,
};

pub use rpc::{
	JsonRpcError, JsonRpcRequest, JsonRpcResponse, ToolCallParams, ToolDescriptor,
	JSONRPC_VERSION,
};

pub use storage::{MetricStorageTrait, StorageError, StorageResult, StorageStats, StorageTrait};
