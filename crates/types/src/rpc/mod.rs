//! JSON-RPC envelope used by the tool-call surface

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const JSONRPC_VERSION: &str = "2.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
	/// Kept as a raw value so a wrong or missing version can be reported
	/// instead of failing deserialization
	#[serde(default)]
	pub jsonrpc: Value,
	#[serde(default)]
	pub id: Value,
	pub method: String,
	#[serde(default)]
	pub params: Value,
}

impl JsonRpcRequest {
	pub fn new(id: impl Into<Value>, method: impl Into<String>, params: Value) -> Self {
		Self {
			jsonrpc: Value::String(JSONRPC_VERSION.to_string()),
			id: id.into(),
			method: method.into(),
			params,
		}
	}

	pub fn has_supported_version(&self) -> bool {
		self.jsonrpc.as_str() == Some(JSONRPC_VERSION)
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
	pub code: i64,
	pub message: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub data: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
	pub jsonrpc: String,
	pub id: Value,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub result: Option<Value>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
	pub fn success(id: Value, result: Value) -> Self {
		Self {
			jsonrpc: JSONRPC_VERSION.to_string(),
			id,
			result: Some(result),
			error: None,
		}
	}

	pub fn failure(id: Value, error: JsonRpcError) -> Self {
		Self {
			jsonrpc: JSONRPC_VERSION.to_string(),
			id,
			result: None,
			error: Some(error),
		}
	}

	pub fn is_error(&self) -> bool {
		self.error.is_some()
	}
}

/// `params` of a `tools.call` request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallParams {
	pub name: String,
	#[serde(default)]
	pub arguments: Map<String, Value>,
}

/// Entry of a `tools.list` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolDescriptor {
	pub name: &'static str,
	pub description: &'static str,
}
