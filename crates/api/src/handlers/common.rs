use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use vitals_types::MetricError;

/// Error response format shared by handlers
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ErrorResponse {
	pub error: String,
	pub message: String,
	pub timestamp: i64,
}

impl ErrorResponse {
	pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			error: error.into(),
			message: message.into(),
			timestamp: chrono::Utc::now().timestamp(),
		}
	}
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// HTTP status for an error category shared by the REST and tool surfaces
pub fn status_for_kind(kind: &str) -> StatusCode {
	match kind {
		"VALIDATION_ERROR" | "AGGREGATION_ERROR" | "PROTOCOL_ERROR" => StatusCode::BAD_REQUEST,
		"NOT_FOUND" => StatusCode::NOT_FOUND,
		_ => StatusCode::INTERNAL_SERVER_ERROR,
	}
}

impl From<MetricError> for ErrorResponse {
	fn from(err: MetricError) -> Self {
		ErrorResponse::new(err.code(), err.to_string())
	}
}

pub fn metric_error(err: MetricError) -> ApiError {
	let status = status_for_kind(err.code());
	(status, Json(ErrorResponse::from(err)))
}
