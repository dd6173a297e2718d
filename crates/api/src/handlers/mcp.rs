//! JSON-RPC tool endpoint
use axum::{extract::State, http::StatusCode, response::Json};
use vitals_types::{JsonRpcRequest, JsonRpcResponse};

use crate::handlers::common::status_for_kind;
use crate::state::AppState;

/// POST /mcp/tools - Dispatch a JSON-RPC envelope.
///
/// The body is always a JSON-RPC response; failed calls also carry the HTTP
/// status matching their error kind.
pub async fn post_tools(
	State(state): State<AppState>,
	Json(request): Json<JsonRpcRequest>,
) -> (StatusCode, Json<JsonRpcResponse>) {
	let response = state.dispatcher.handle(request).await;

	let status = response
		.error
		.as_ref()
		.and_then(|error| error.data.as_ref())
		.and_then(|data| data.get("kind"))
		.and_then(|kind| kind.as_str())
		.map(status_for_kind)
		.unwrap_or(StatusCode::OK);

	(status, Json(response))
}
