use axum::{
	middleware,
	routing::{delete, get, post},
	Router,
};
use tower::ServiceBuilder;
use tower_http::{
	compression::CompressionLayer,
	cors::CorsLayer,
	limit::RequestBodyLimitLayer,
	request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
	trace::TraceLayer,
};
use tracing::Level;

use crate::auth::require_api_key;
use crate::handlers::{
	delete_metric, get_events, get_metrics, health, list_metric_types, post_metric,
	post_metrics_batch, post_tools, post_trend, ready,
};
use crate::security::add_security_headers;
use crate::state::AppState;
#[cfg(feature = "openapi")]
use crate::openapi::ApiDoc;
#[cfg(feature = "openapi")]
use utoipa::OpenApi;
#[cfg(feature = "openapi")]
use utoipa_swagger_ui::SwaggerUi;

const BODY_LIMIT_BYTES: usize = 1024 * 1024;

/// Build the application router with middleware and state applied
pub fn create_router(state: AppState) -> Router {
	let cors = CorsLayer::permissive();
	let body_limit = RequestBodyLimitLayer::new(BODY_LIMIT_BYTES);
	let trace = TraceLayer::new_for_http()
		.make_span_with(|req: &axum::http::Request<_>| {
			let req_id = req
				.headers()
				.get("x-request-id")
				.and_then(|v| v.to_str().ok())
				.unwrap_or("-");
			tracing::info_span!(
				"http_request",
				method = %req.method(),
				uri = %req.uri(),
				req_id
			)
		})
		.on_request(tower_http::trace::DefaultOnRequest::new().level(Level::INFO))
		.on_response(
			tower_http::trace::DefaultOnResponse::new()
				.level(Level::INFO)
				.latency_unit(tower_http::LatencyUnit::Millis),
		);
	let req_id = ServiceBuilder::new()
		.layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
		.layer(PropagateRequestIdLayer::x_request_id());

	let router = Router::new()
		.route("/health", get(health))
		.route("/health/", get(health))
		.route("/ready", get(ready))
		.route("/api/metric-types", get(list_metric_types))
		.route("/api/metrics", post(post_metric).get(get_metrics))
		.route("/api/metrics/batch", post(post_metrics_batch))
		.route("/api/metrics/trend", post(post_trend))
		.route("/api/metrics/{record_id}", delete(delete_metric))
		.route("/mcp/tools", post(post_tools))
		.route("/mcp/events", get(get_events));

	#[cfg(feature = "openapi")]
	let router = router
		.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

	let router = router
		.layer(middleware::from_fn_with_state(state.clone(), require_api_key))
		.layer(cors)
		.layer(CompressionLayer::new())
		.layer(trace)
		.layer(req_id)
		.layer(body_limit);

	add_security_headers(router).with_state(state)
}
