//! Writes the OpenAPI document for the REST surface to a file.
//!
//! ```bash
//! cargo run -p vitals-api --bin generate_openapi --features openapi -- docs/api/openapi.json
//! ```
#[cfg(feature = "openapi")]
use std::fs;
#[cfg(feature = "openapi")]
use std::path::Path;

#[cfg(feature = "openapi")]
use utoipa::OpenApi;
#[cfg(feature = "openapi")]
use vitals_api::openapi::ApiDoc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
	#[cfg(not(feature = "openapi"))]
	{
		eprintln!("Error: The 'openapi' feature must be enabled to generate OpenAPI specs.");
		eprintln!("Run with: cargo run -p vitals-api --bin generate_openapi --features openapi");
		std::process::exit(1);
	}

	#[cfg(feature = "openapi")]
	{
		let output_path = std::env::args()
			.nth(1)
			.unwrap_or_else(|| "docs/api/openapi.json".to_string());

		if let Some(parent) = Path::new(&output_path).parent() {
			if !parent.as_os_str().is_empty() && !parent.exists() {
				fs::create_dir_all(parent)?;
			}
		}

		let json = serde_json::to_string_pretty(&ApiDoc::openapi())?;
		fs::write(&output_path, json)?;
		println!("OpenAPI specification written to {}", output_path);
	}

	#[allow(unreachable_code)]
	Ok(())
}
