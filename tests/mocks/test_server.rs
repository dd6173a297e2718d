//! Test server for end-to-end tests over real HTTP

use axum::Router;
use tokio::task::JoinHandle;
use vitals_hub::{AppState, Settings};

use super::api_fixtures::ApiFixtures;

/// Test server instance bound to an ephemeral local port
pub struct TestServer {
	pub base_url: String,
	#[allow(dead_code)]
	pub state: AppState,
	pub handle: JoinHandle<()>,
}

impl TestServer {
	/// Spawn a test server with default settings
	#[allow(dead_code)]
	pub async fn spawn() -> Result<Self, Box<dyn std::error::Error>> {
		Self::spawn_with_settings(ApiFixtures::settings()).await
	}

	/// Spawn a test server with the given settings
	pub async fn spawn_with_settings(
		settings: Settings,
	) -> Result<Self, Box<dyn std::error::Error>> {
		let (app, state) = ApiFixtures::app(settings).await;
		Self::spawn_server_with_app(app, state).await
	}

	async fn spawn_server_with_app(
		app: Router,
		state: AppState,
	) -> Result<Self, Box<dyn std::error::Error>> {
		let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
		let addr = listener.local_addr()?;
		let base_url = format!("http://{}:{}", addr.ip(), addr.port());

		let handle = tokio::spawn(async move {
			let _ = axum::serve(listener, app).await;
		});

		// Give server time to start
		tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;

		Ok(Self {
			base_url,
			state,
			handle,
		})
	}

	#[allow(dead_code)]
	pub fn url(&self, path: &str) -> String {
		format!("{}{}", self.base_url, path)
	}

	#[allow(dead_code)]
	pub fn abort(self) {
		self.handle.abort();
	}
}
