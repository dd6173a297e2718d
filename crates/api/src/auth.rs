//! Optional shared-key gate on every route except `/health`

use axum::{
	extract::{Request, State},
	http::StatusCode,
	middleware::Next,
	response::{IntoResponse, Response},
	Json,
};
use tracing::warn;

use crate::handlers::common::ErrorResponse;
use crate::state::AppState;

pub const API_KEY_HEADER: &str = "x-api-key";

const PUBLIC_PATHS: &[&str] = &["/health", "/health/"];

pub async fn require_api_key(
	State(state): State<AppState>,
	request: Request,
	next: Next,
) -> Response {
	let Some(expected) = state.api_key.as_ref() else {
		return next.run(request).await;
	};
	if PUBLIC_PATHS.contains(&request.uri().path()) {
		return next.run(request).await;
	}

	let presented = request
		.headers()
		.get(API_KEY_HEADER)
		.and_then(|value| value.to_str().ok());

	match presented {
		Some(key) if expected.matches(key) => next.run(request).await,
		_ => {
			warn!("Rejected request to {} without a valid API key", request.uri().path());
			(
				StatusCode::UNAUTHORIZED,
				Json(ErrorResponse::new("UNAUTHORIZED", "Missing or invalid API key")),
			)
				.into_response()
		},
	}
}
