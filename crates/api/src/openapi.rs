use utoipa::OpenApi;

use crate::handlers::common::ErrorResponse;
use crate::handlers::health::ReadinessResponse;
use crate::handlers::{health, metrics};
use vitals_types::{
	BatchStoreMetricsRequest, BatchStoreMetricsResponse, DeleteRecordResponse, MetricRecordView,
	MetricType, MetricTypesResponse, QueryMetricsResponse, StoreMetricRequest,
	StoreMetricResponse, TrendPoint, TrendStats, TrendSummary, TrendSummaryRequest,
};

#[derive(OpenApi)]
#[openapi(
	paths(
		health::health,
		health::ready,
		metrics::list_metric_types,
		metrics::post_metric,
		metrics::post_metrics_batch,
		metrics::get_metrics,
		metrics::post_trend,
		metrics::delete_metric,
	),
	components(schemas(
		StoreMetricRequest, StoreMetricResponse,
		BatchStoreMetricsRequest, BatchStoreMetricsResponse,
		MetricRecordView, QueryMetricsResponse,
		TrendSummaryRequest, TrendSummary, TrendPoint, TrendStats,
		DeleteRecordResponse, MetricType, MetricTypesResponse,
		ReadinessResponse, ErrorResponse
	)),
	tags(
		(name = "metrics", description = "Metric ingestion, query and trend endpoints"),
		(name = "health", description = "Health and readiness endpoints")
	)
)]
pub struct ApiDoc;
