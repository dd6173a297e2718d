//! Configuration loading utilities

use crate::{ConfigValidationError, Settings};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use thiserror::Error;

/// Prefix for environment overrides, e.g. `VITALS__SERVER__PORT=9000`
pub const ENV_PREFIX: &str = "VITALS";

#[derive(Debug, Error)]
pub enum ConfigLoadError {
	#[error("Failed to load configuration: {0}")]
	Config(#[from] ConfigError),
	#[error("Invalid configuration: {0}")]
	Validation(#[from] ConfigValidationError),
}

/// Load configuration from the optional `config/config` file, then apply
/// `VITALS__*` environment overrides and validate the result
pub fn load_config() -> Result<Settings, ConfigLoadError> {
	let builder = Config::builder()
		.add_source(File::with_name("config/config").required(false))
		.add_source(
			Environment::with_prefix(ENV_PREFIX)
				.separator("__")
				.try_parsing(true),
		);

	build(builder)
}

fn build(builder: ConfigBuilder<DefaultState>) -> Result<Settings, ConfigLoadError> {
	let settings: Settings = builder.build()?.try_deserialize()?;
	settings.validate()?;
	Ok(settings)
}
