//! Service startup and shutdown banners

use std::env;
use tracing::info;

/// Logs service information at startup
pub fn log_service_info() {
	let service_name = "vitals-hub";
	let service_version = env!("CARGO_PKG_VERSION");

	info!("=== Vitals Hub Starting ===");
	info!("🚀 Service: {} v{}", service_name, service_version);
	info!("💻 Platform: {} ({})", env::consts::OS, env::consts::ARCH);

	if let Ok(cwd) = env::current_dir() {
		info!("📁 Working Directory: {}", cwd.display());
	}
	if let Ok(rust_log) = env::var("RUST_LOG") {
		info!("🔧 Log Level: {}", rust_log);
	}

	info!(
		"🕒 Started at: {}",
		chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
	);
}

/// Logs service shutdown information
pub fn log_service_shutdown() {
	info!("🛑 Vitals Hub Shutting Down");
	info!(
		"🕒 Shutdown at: {}",
		chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
	);
}

/// Logs startup completion with the bound address and event heartbeat
pub fn log_startup_complete(bind_address: &str, heartbeat_secs: u64) {
	info!("✅ Vitals Hub Started Successfully");
	info!("🌐 Server listening on: {}", bind_address);
	info!("📡 Live events at /mcp/events (heartbeat every {}s)", heartbeat_secs);
}
