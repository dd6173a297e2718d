//! Vitals Service
//!
//! Metric ingestion and querying, trend aggregation, the JSON-RPC tool
//! dispatcher and the in-process event bus.

pub mod dispatcher;
pub mod events;
pub mod metrics;
pub mod trend;

pub use dispatcher::{tool_descriptors, DispatchError, Tool, ToolDispatcher};
pub use events::{
	run_live_stream, BusEvent, EventBus, EventKind, EventPublisher, Subscription,
	DEFAULT_HEARTBEAT,
};
pub use metrics::{MetricService, MetricServiceTrait, QueryLimits};
