use std::sync::Arc;
use std::time::Duration;

use vitals_service::{EventBus, MetricServiceTrait, ToolDispatcher, DEFAULT_HEARTBEAT};
use vitals_types::ApiKey;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
	pub metric_service: Arc<dyn MetricServiceTrait>,
	pub dispatcher: Arc<ToolDispatcher>,
	pub events: Arc<EventBus>,
	/// Required `x-api-key` value, if the gate is enabled
	pub api_key: Option<Arc<ApiKey>>,
	/// Idle interval between heartbeat frames on the live stream
	pub heartbeat: Duration,
}

impl AppState {
	/// Wire a dispatcher to the given service and bus
	pub fn new(metric_service: Arc<dyn MetricServiceTrait>, events: Arc<EventBus>) -> Self {
		let dispatcher = Arc::new(ToolDispatcher::new(
			Arc::clone(&metric_service),
			events.publisher(),
		));
		Self {
			metric_service,
			dispatcher,
			events,
			api_key: None,
			heartbeat: DEFAULT_HEARTBEAT,
		}
	}

	pub fn with_api_key(mut self, api_key: Option<ApiKey>) -> Self {
		self.api_key = api_key.map(Arc::new);
		self
	}

	pub fn with_heartbeat(mut self, heartbeat: Duration) -> Self {
		self.heartbeat = heartbeat;
		self
	}
}
