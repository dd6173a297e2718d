//! Vitals Hub Server
//!
//! Main entry point for the hub server

use vitals_hub::HubBuilder;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	HubBuilder::new().start_server().await
}
