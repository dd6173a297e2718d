//! Metric REST handlers
use axum::{
	extract::{Path, Query, State},
	http::StatusCode,
	response::Json,
};
use serde::Deserialize;
use tracing::{debug, info};

#[cfg(feature = "openapi")]
use crate::handlers::common::ErrorResponse;
use crate::handlers::common::{metric_error, ApiError};
use crate::state::AppState;
use vitals_types::{
	BatchStoreMetricsRequest, BatchStoreMetricsResponse, DeleteRecordResponse,
	MetricTypesResponse, QueryMetricsRequest, QueryMetricsResponse, StoreMetricRequest,
	StoreMetricResponse, TrendSummary, TrendSummaryRequest,
};

/// GET /api/metric-types - List the metric type catalog
#[cfg_attr(feature = "openapi", utoipa::path(
	get,
	path = "/api/metric-types",
	responses((status = 200, description = "Metric type catalog", body = MetricTypesResponse)),
	tag = "metrics"
))]
pub async fn list_metric_types(State(state): State<AppState>) -> Json<MetricTypesResponse> {
	Json(MetricTypesResponse {
		types: state.metric_service.list_types(),
	})
}

/// POST /api/metrics - Store a single metric
#[cfg_attr(feature = "openapi", utoipa::path(
	post,
	path = "/api/metrics",
	request_body = StoreMetricRequest,
	responses(
		(status = 200, description = "Stored or deduplicated", body = StoreMetricResponse),
		(status = 400, description = "Invalid payload", body = ErrorResponse)
	),
	tag = "metrics"
))]
pub async fn post_metric(
	State(state): State<AppState>,
	Json(request): Json<StoreMetricRequest>,
) -> Result<Json<StoreMetricResponse>, ApiError> {
	debug!(
		"Received {} metric for user {}",
		request.type_code, request.user_id
	);

	let stored = state
		.metric_service
		.store(request)
		.await
		.map_err(metric_error)?;
	Ok(Json(StoreMetricResponse::from(stored)))
}

/// POST /api/metrics/batch - Store metrics in order, aborting on the first failure
#[cfg_attr(feature = "openapi", utoipa::path(
	post,
	path = "/api/metrics/batch",
	request_body = BatchStoreMetricsRequest,
	responses(
		(status = 200, description = "All records stored", body = BatchStoreMetricsResponse),
		(status = 400, description = "A record was rejected", body = ErrorResponse)
	),
	tag = "metrics"
))]
pub async fn post_metrics_batch(
	State(state): State<AppState>,
	Json(request): Json<BatchStoreMetricsRequest>,
) -> Result<Json<BatchStoreMetricsResponse>, ApiError> {
	info!("Received batch of {} metrics", request.records.len());

	let stored = state
		.metric_service
		.batch_store(request.records)
		.await
		.map_err(metric_error)?;
	Ok(Json(BatchStoreMetricsResponse {
		records: stored.into_iter().map(StoreMetricResponse::from).collect(),
	}))
}

/// GET /api/metrics - Query live metrics
#[cfg_attr(feature = "openapi", utoipa::path(
	get,
	path = "/api/metrics",
	params(
		("user_id" = String, Query, description = "Owner of the records"),
		("type" = Option<String>, Query, description = "Metric type code"),
		("limit" = Option<usize>, Query, description = "Maximum records returned"),
		("order" = Option<String>, Query, description = "asc or desc on recorded_at"),
		("start_time" = Option<String>, Query, description = "Inclusive lower bound"),
		("end_time" = Option<String>, Query, description = "Inclusive upper bound"),
		("source" = Option<String>, Query, description = "Exact source match")
	),
	responses(
		(status = 200, description = "Matching records", body = QueryMetricsResponse),
		(status = 400, description = "Invalid filter", body = ErrorResponse)
	),
	tag = "metrics"
))]
pub async fn get_metrics(
	State(state): State<AppState>,
	Query(request): Query<QueryMetricsRequest>,
) -> Result<Json<QueryMetricsResponse>, ApiError> {
	let records = state
		.metric_service
		.query(request)
		.await
		.map_err(metric_error)?;
	Ok(Json(QueryMetricsResponse::from(records)))
}

/// POST /api/metrics/trend - Bucketed trend summary
#[cfg_attr(feature = "openapi", utoipa::path(
	post,
	path = "/api/metrics/trend",
	request_body = TrendSummaryRequest,
	responses(
		(status = 200, description = "Trend summary", body = TrendSummary),
		(status = 400, description = "Invalid request or non-numeric data", body = ErrorResponse)
	),
	tag = "metrics"
))]
pub async fn post_trend(
	State(state): State<AppState>,
	Json(request): Json<TrendSummaryRequest>,
) -> Result<Json<TrendSummary>, ApiError> {
	let summary = state
		.metric_service
		.trend_summary(request)
		.await
		.map_err(metric_error)?;
	Ok(Json(summary))
}

#[derive(Debug, Deserialize)]
pub struct DeleteParams {
	pub user_id: String,
}

/// DELETE /api/metrics/{record_id}?user_id= - Soft-delete a record
#[cfg_attr(feature = "openapi", utoipa::path(
	delete,
	path = "/api/metrics/{record_id}",
	params(
		("record_id" = String, Path, description = "Record to delete"),
		("user_id" = String, Query, description = "Owner of the record")
	),
	responses(
		(status = 200, description = "Record deleted", body = DeleteRecordResponse),
		(status = 404, description = "No live record for this owner", body = DeleteRecordResponse)
	),
	tag = "metrics"
))]
pub async fn delete_metric(
	State(state): State<AppState>,
	Path(record_id): Path<String>,
	Query(params): Query<DeleteParams>,
) -> Result<(StatusCode, Json<DeleteRecordResponse>), ApiError> {
	let deleted = state
		.metric_service
		.delete(&params.user_id, &record_id)
		.await
		.map_err(metric_error)?;

	let status = if deleted {
		StatusCode::OK
	} else {
		StatusCode::NOT_FOUND
	};
	Ok((status, Json(DeleteRecordResponse::from_outcome(deleted))))
}
