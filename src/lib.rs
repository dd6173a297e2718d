//! Vitals Hub Library
//!
//! Deduplicating health-metric ingestion, time-range queries, trend
//! summaries and a JSON-RPC tool surface whose invocations are broadcast on
//! a live event stream.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;

// Core domain types
pub use vitals_types::{
	chrono, serde_json, ApiKey, GroupBy, JsonRpcRequest, JsonRpcResponse, MetricError,
	MetricRecord, MetricType, MetricValue, SortOrder, TrendSummary,
};

// Service layer
pub use vitals_service::{
	DispatchError, EventBus, EventKind, EventPublisher, MetricService, MetricServiceTrait,
	QueryLimits, Subscription, ToolDispatcher,
};

// Storage layer
pub use vitals_storage::{MemoryStore, MetricStorage, Storage, StorageError, StorageResult};

// API layer
pub use vitals_api::{create_router, AppState};

// Config
pub use vitals_config::{
	load_config, log_service_info, log_service_shutdown, log_startup_complete, Settings,
};

pub mod models {
	pub use vitals_types::*;
}

pub mod service {
	pub use vitals_service::*;
}

pub mod storage {
	pub use vitals_storage::*;
}

pub mod config {
	pub use vitals_config::*;
}

pub mod api {
	pub use vitals_api::*;
}

/// Builder for a running Vitals Hub
pub struct HubBuilder<S = MemoryStore>
where
	S: Storage + 'static,
{
	settings: Option<Settings>,
	storage: S,
}

impl Default for HubBuilder<MemoryStore> {
	fn default() -> Self {
		Self::new()
	}
}

impl HubBuilder<MemoryStore> {
	/// Create a new builder with in-memory storage
	pub fn new() -> Self {
		Self::with_storage(MemoryStore::new())
	}
}

impl<S> HubBuilder<S>
where
	S: Storage + 'static,
{
	/// Create a new builder with the provided storage
	pub fn with_storage(storage: S) -> Self {
		Self {
			settings: None,
			storage,
		}
	}

	/// Set custom settings
	pub fn with_settings(mut self, settings: Settings) -> Self {
		self.settings = Some(settings);
		self
	}

	/// Get the current settings
	pub fn settings(&self) -> Option<&Settings> {
		self.settings.as_ref()
	}

	/// Initialize tracing with configuration-based settings
	fn init_tracing_from_settings(settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
		use vitals_config::LogFormat;

		let log_level = &settings.logging.level;
		let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
			.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));
		let structured = settings.logging.structured;

		match settings.logging.format {
			LogFormat::Json => tracing_subscriber::fmt()
				.json()
				.with_env_filter(env_filter)
				.with_target(structured)
				.with_thread_ids(structured)
				.try_init()
				.map_err(|e| format!("Failed to initialize tracing: {}", e))?,
			LogFormat::Pretty => tracing_subscriber::fmt()
				.pretty()
				.with_env_filter(env_filter)
				.with_target(structured)
				.with_thread_ids(structured)
				.try_init()
				.map_err(|e| format!("Failed to initialize tracing: {}", e))?,
			LogFormat::Compact => tracing_subscriber::fmt()
				.compact()
				.with_env_filter(env_filter)
				.with_target(structured)
				.with_thread_ids(structured)
				.try_init()
				.map_err(|e| format!("Failed to initialize tracing: {}", e))?,
		}

		info!(
			"Logging configuration applied: level={}, format={:?}, structured={}",
			settings.logging.level, settings.logging.format, settings.logging.structured
		);
		Ok(())
	}

	/// Validate settings, start the event bus and return the router with its state
	pub async fn start(self) -> Result<(axum::Router, AppState), Box<dyn std::error::Error>> {
		let settings = self.settings.unwrap_or_default();
		settings.validate()?;

		let api_key = settings
			.resolve_api_key()
			.map_err(|e| format!("Failed to resolve API key: {}", e))?;
		if api_key.is_some() {
			info!("API key required on all routes except /health");
		}

		let storage: Arc<dyn Storage> = Arc::new(self.storage);
		let metric_service = MetricService::new(storage).with_limits(QueryLimits {
			default_limit: settings.query.default_limit,
			max_limit: settings.query.max_limit,
		});

		let events = Arc::new(EventBus::start());
		let app_state = AppState::new(Arc::new(metric_service), events)
			.with_api_key(api_key)
			.with_heartbeat(settings.heartbeat_interval());

		let router = create_router(app_state.clone());
		Ok((router, app_state))
	}

	/// Start the complete server:
	/// - Loading .env file
	/// - Loading configuration (file and `VITALS__*` environment)
	/// - Initializing tracing
	/// - Binding and serving until ctrl-c, then stopping the event bus
	pub async fn start_server(mut self) -> Result<(), Box<dyn std::error::Error>> {
		dotenvy::dotenv().ok();

		let settings = match self.settings.take() {
			Some(settings) => settings,
			None => load_config()?,
		};

		Self::init_tracing_from_settings(&settings)?;
		log_service_info();

		let bind_addr = settings.bind_address();
		let addr: SocketAddr = bind_addr
			.parse()
			.map_err(|e| format!("Invalid bind address '{}': {}", bind_addr, e))?;
		let heartbeat_secs = settings.events.heartbeat_secs;

		self.settings = Some(settings);
		let (app, state) = self.start().await?;

		let listener = tokio::net::TcpListener::bind(addr).await?;

		log_startup_complete(&bind_addr, heartbeat_secs);
		info!("API endpoints available:");
		info!("  GET    /health");
		info!("  GET    /ready");
		info!("  GET    /api/metric-types");
		info!("  POST   /api/metrics");
		info!("  POST   /api/metrics/batch");
		info!("  GET    /api/metrics");
		info!("  POST   /api/metrics/trend");
		info!("  DELETE /api/metrics/{{record_id}}");
		info!("  POST   /mcp/tools");
		info!("  GET    /mcp/events");
		if cfg!(feature = "openapi") {
			info!("  GET    /swagger-ui");
			info!("  GET    /api-docs/openapi.json");
		}

		axum::serve(listener, app)
			.with_graceful_shutdown(shutdown_signal())
			.await?;

		state.events.shutdown().await;
		log_service_shutdown();
		Ok(())
	}
}

async fn shutdown_signal() {
	if let Err(e) = tokio::signal::ctrl_c().await {
		tracing::error!("Failed to listen for shutdown signal: {}", e);
		std::future::pending::<()>().await;
	}
	info!("Shutdown signal received");
}
