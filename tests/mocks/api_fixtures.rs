//! Request payloads and app builders for integration tests

use axum::Router;
use vitals_hub::{
	serde_json::{json, Value},
	AppState, HubBuilder, Settings,
};

/// API test data fixtures
#[allow(dead_code)]
pub struct ApiFixtures;

#[allow(dead_code)]
pub const TEST_API_KEY: &str = "test-api-key-0123456789";

#[allow(dead_code)]
impl ApiFixtures {
	/// Weight sample at a fixed time
	pub fn weight(user_id: &str, value: f64, recorded_at: &str) -> Value {
		json!({
			"user_id": user_id,
			"type": "body/weight",
			"value": value,
			"recorded_at": recorded_at,
			"source": "smart-scale",
		})
	}

	/// Structured running session sample
	pub fn running_session(user_id: &str, distance_km: f64, recorded_at: &str) -> Value {
		json!({
			"user_id": user_id,
			"type": "sport/running_session",
			"value": { "distance_km": distance_km, "duration_min": 30 },
			"recorded_at": recorded_at,
			"source": "watch",
			"metadata": { "device": "watch", "firmware": "2.1" },
		})
	}

	/// JSON-RPC `tools.call` envelope
	pub fn tool_call(id: i64, name: &str, arguments: Value) -> Value {
		json!({
			"jsonrpc": "2.0",
			"id": id,
			"method": "tools.call",
			"params": { "name": name, "arguments": arguments },
		})
	}

	/// JSON-RPC `tools.list` envelope
	pub fn tools_list(id: i64) -> Value {
		json!({ "jsonrpc": "2.0", "id": id, "method": "tools.list" })
	}

	/// Default settings tuned for tests
	pub fn settings() -> Settings {
		let mut settings = Settings::default();
		settings.server.host = "127.0.0.1".to_string();
		settings.logging.level = "debug".to_string();
		settings
	}

	/// Settings with the `x-api-key` gate enabled
	pub fn settings_with_api_key() -> Settings {
		let mut settings = Self::settings();
		settings.security.api_key =
			Some(vitals_hub::config::ConfigurableValue::from_plain(TEST_API_KEY));
		settings
	}

	/// Router and state built the same way the server builds them
	pub async fn app(settings: Settings) -> (Router, AppState) {
		HubBuilder::new()
			.with_settings(settings)
			.start()
			.await
			.expect("hub should start")
	}
}
