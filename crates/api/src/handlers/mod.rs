pub mod common;
pub mod events;
pub mod health;
pub mod mcp;
pub mod metrics;

pub use events::get_events;
pub use health::{health, ready};
pub use mcp::post_tools;
pub use metrics::{
	delete_metric, get_metrics, list_metric_types, post_metric, post_metrics_batch, post_trend,
};
