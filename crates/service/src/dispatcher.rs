//! JSON-RPC tool dispatcher
//!
//! Routes `tools.list` and `tools.call` requests to the metric service and
//! mirrors every outcome onto the event bus as a `tool_call` or `tool_error`
//! event.

use std::sync::Arc;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::{debug, warn};
use vitals_types::{
	BatchStoreMetricsRequest, BatchStoreMetricsResponse, DeleteRecordRequest,
	DeleteRecordResponse, JsonRpcError, JsonRpcRequest, JsonRpcResponse, MetricError,
	MetricTypesResponse, QueryMetricsRequest, QueryMetricsResponse, StoreMetricRequest,
	StoreMetricResponse, ToolCallParams, ToolDescriptor, TrendSummaryRequest,
};

use crate::events::{EventKind, EventPublisher};
use crate::metrics::MetricServiceTrait;

pub const METHOD_TOOLS_LIST: &str = "tools.list";
pub const METHOD_TOOLS_CALL: &str = "tools.call";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
	StoreMetric,
	BatchStoreMetrics,
	QueryMetrics,
	TrendSummary,
	DeleteRecord,
	ListMetricTypes,
}

const TOOLS: [(Tool, ToolDescriptor); 6] = [
	(
		Tool::StoreMetric,
		ToolDescriptor {
			name: "health_store_metric",
			description: "Store a single health metric record",
		},
	),
	(
		Tool::BatchStoreMetrics,
		ToolDescriptor {
			name: "health_batch_store_metrics",
			description: "Store multiple health metric records in batch",
		},
	),
	(
		Tool::QueryMetrics,
		ToolDescriptor {
			name: "health_query_metrics",
			description: "Query stored metrics",
		},
	),
	(
		Tool::TrendSummary,
		ToolDescriptor {
			name: "health_trend_summary",
			description: "Return aggregated trend information",
		},
	),
	(
		Tool::DeleteRecord,
		ToolDescriptor {
			name: "health_delete_record",
			description: "Delete a metric record",
		},
	),
	(
		Tool::ListMetricTypes,
		ToolDescriptor {
			name: "health_list_metric_types",
			description: "List supported metric types",
		},
	),
];

impl Tool {
	pub fn from_name(name: &str) -> Option<Tool> {
		TOOLS
			.iter()
			.find(|(_, descriptor)| descriptor.name == name)
			.map(|(tool, _)| *tool)
	}
}

/// Tool descriptors in their fixed listing order
pub fn tool_descriptors() -> Vec<ToolDescriptor> {
	TOOLS.iter().map(|(_, descriptor)| descriptor.clone()).collect()
}

#[derive(Debug, Error)]
pub enum DispatchError {
	#[error("Unsupported JSON-RPC version: {version}")]
	Protocol { version: String },

	#[error("Unknown method: {method}")]
	MethodNotFound { method: String },

	#[error("Unknown tool: {name}")]
	ToolNotFound { name: String },

	#[error("Invalid params: {reason}")]
	InvalidParams { reason: String },

	#[error("Internal error: {reason}")]
	Internal { reason: String },

	#[error(transparent)]
	Metric(#[from] MetricError),
}

impl DispatchError {
	/// JSON-RPC error code
	pub fn code(&self) -> i64 {
		match self {
			DispatchError::Protocol { .. } => -32600,
			DispatchError::MethodNotFound { .. } | DispatchError::ToolNotFound { .. } => -32601,
			DispatchError::InvalidParams { .. } => -32602,
			DispatchError::Internal { .. } => -32603,
			DispatchError::Metric(err) => match err {
				MetricError::Validation(_) => -32602,
				MetricError::NotFound { .. } => -32601,
				MetricError::Aggregation(_) => -32001,
				MetricError::Storage(_) => -32000,
			},
		}
	}

	/// Error category shared with the REST surface
	pub fn kind(&self) -> &'static str {
		match self {
			DispatchError::Protocol { .. } => "PROTOCOL_ERROR",
			DispatchError::MethodNotFound { .. } | DispatchError::ToolNotFound { .. } => {
				"NOT_FOUND"
			},
			DispatchError::InvalidParams { .. } => "VALIDATION_ERROR",
			DispatchError::Internal { .. } => "INTERNAL_ERROR",
			DispatchError::Metric(err) => err.code(),
		}
	}

	pub fn to_rpc_error(&self) -> JsonRpcError {
		JsonRpcError {
			code: self.code(),
			message: self.to_string(),
			data: Some(json!({ "kind": self.kind() })),
		}
	}
}

#[derive(Clone)]
pub struct ToolDispatcher {
	service: Arc<dyn MetricServiceTrait>,
	events: EventPublisher,
}

impl ToolDispatcher {
	pub fn new(service: Arc<dyn MetricServiceTrait>, events: EventPublisher) -> Self {
		Self { service, events }
	}

	/// Handle one request envelope. Always produces a response; failures are
	/// carried in its `error` slot.
	pub async fn handle(&self, request: JsonRpcRequest) -> JsonRpcResponse {
		let call = if request.method == METHOD_TOOLS_CALL {
			serde_json::from_value::<ToolCallParams>(request.params.clone()).ok()
		} else {
			None
		};

		let outcome = self.dispatch(&request, call.as_ref()).await;
		self.publish_outcome(&request, call.as_ref(), &outcome);

		match outcome {
			Ok(result) => JsonRpcResponse::success(request.id, result),
			Err(err) => JsonRpcResponse::failure(request.id, err.to_rpc_error()),
		}
	}

	async fn dispatch(
		&self,
		request: &JsonRpcRequest,
		call: Option<&ToolCallParams>,
	) -> Result<Value, DispatchError> {
		if !request.has_supported_version() {
			return Err(DispatchError::Protocol {
				version: match &request.jsonrpc {
					Value::String(s) => s.clone(),
					other => other.to_string(),
				},
			});
		}

		match request.method.as_str() {
			METHOD_TOOLS_LIST => Ok(json!({ "tools": tool_descriptors() })),
			METHOD_TOOLS_CALL => {
				let call = call.ok_or_else(|| DispatchError::InvalidParams {
					reason: "params must be an object with 'name' and 'arguments'".to_string(),
				})?;
				self.call_tool(&call.name, &call.arguments).await
			},
			other => Err(DispatchError::MethodNotFound {
				method: other.to_string(),
			}),
		}
	}

	async fn call_tool(
		&self,
		name: &str,
		arguments: &Map<String, Value>,
	) -> Result<Value, DispatchError> {
		let tool = Tool::from_name(name).ok_or_else(|| DispatchError::ToolNotFound {
			name: name.to_string(),
		})?;
		debug!("Dispatching tool {}", name);

		match tool {
			Tool::StoreMetric => {
				let request: StoreMetricRequest = parse_arguments(arguments)?;
				let stored = self.service.store(request).await?;
				to_result(StoreMetricResponse::from(stored))
			},
			Tool::BatchStoreMetrics => {
				let request: BatchStoreMetricsRequest = parse_arguments(arguments)?;
				let stored = self.service.batch_store(request.records).await?;
				to_result(BatchStoreMetricsResponse {
					records: stored.into_iter().map(StoreMetricResponse::from).collect(),
				})
			},
			Tool::QueryMetrics => {
				let request: QueryMetricsRequest = parse_arguments(arguments)?;
				let records = self.service.query(request).await?;
				to_result(QueryMetricsResponse::from(records))
			},
			Tool::TrendSummary => {
				let request: TrendSummaryRequest = parse_arguments(arguments)?;
				to_result(self.service.trend_summary(request).await?)
			},
			Tool::DeleteRecord => {
				let request: DeleteRecordRequest = parse_arguments(arguments)?;
				let deleted = self
					.service
					.delete(&request.user_id, &request.record_id)
					.await?;
				to_result(DeleteRecordResponse::from_outcome(deleted))
			},
			Tool::ListMetricTypes => to_result(MetricTypesResponse {
				types: self.service.list_types(),
			}),
		}
	}

	fn publish_outcome(
		&self,
		request: &JsonRpcRequest,
		call: Option<&ToolCallParams>,
		outcome: &Result<Value, DispatchError>,
	) {
		let mut payload = json!({
			"id": request.id,
			"method": request.method,
			"tool": call.map(|c| c.name.clone()),
			"arguments": call.map(|c| Value::Object(c.arguments.clone())),
			"timestamp": Utc::now().to_rfc3339(),
		});

		let kind = match outcome {
			Ok(result) => {
				payload["result"] = result.clone();
				EventKind::ToolCall
			},
			Err(err) => {
				warn!("Tool dispatch failed: {}", err);
				payload["error"] = json!({
					"code": err.code(),
					"kind": err.kind(),
					"message": err.to_string(),
				});
				EventKind::ToolError
			},
		};

		self.events.publish(kind, payload);
	}
}

fn parse_arguments<T: DeserializeOwned>(arguments: &Map<String, Value>) -> Result<T, DispatchError> {
	serde_json::from_value(Value::Object(arguments.clone())).map_err(|e| {
		DispatchError::InvalidParams {
			reason: e.to_string(),
		}
	})
}

fn to_result<T: Serialize>(value: T) -> Result<Value, DispatchError> {
	serde_json::to_value(value).map_err(|e| DispatchError::Internal {
		reason: e.to_string(),
	})
}
