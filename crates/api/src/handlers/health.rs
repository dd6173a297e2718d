use axum::{extract::State, http::StatusCode, response::Json};
use serde::Serialize;
use vitals_storage::StorageStats;

use crate::state::AppState;

/// Liveness probe
#[cfg_attr(feature = "openapi", utoipa::path(
	get,
	path = "/health",
	responses((status = 200, description = "Service healthy", body = String)),
	tag = "health"
))]
pub async fn health() -> &'static str {
	"OK"
}

/// Readiness response
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ReadinessResponse {
	pub status: String,
	pub storage_healthy: bool,
	pub event_bus_running: bool,
	pub live_subscribers: usize,
	pub storage: Option<StorageStats>,
}

/// GET /ready - Readiness probe with storage and event bus checks
#[cfg_attr(feature = "openapi", utoipa::path(
	get,
	path = "/ready",
	responses(
		(status = 200, description = "Ready", body = ReadinessResponse),
		(status = 503, description = "Degraded", body = ReadinessResponse)
	),
	tag = "health"
))]
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
	let storage_healthy = state.metric_service.health_check().await.unwrap_or(false);
	let storage = state.metric_service.stats().await.ok();
	let event_bus_running = state.events.is_running();

	let overall = storage_healthy && event_bus_running;
	let status = if overall { "ready" } else { "degraded" };

	let body = ReadinessResponse {
		status: status.to_string(),
		storage_healthy,
		event_bus_running,
		live_subscribers: state.events.subscriber_count(),
		storage,
	};
	let code = if overall {
		StatusCode::OK
	} else {
		StatusCode::SERVICE_UNAVAILABLE
	};
	(code, Json(body))
}
