//! Configuration settings structures

use crate::{configurable_value::ConfigurableValue, ConfigurableValueError};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use vitals_types::ApiKey;

/// Main application settings
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Settings {
	pub server: ServerSettings,
	pub logging: LoggingSettings,
	pub query: QuerySettings,
	pub events: EventSettings,
	pub security: SecuritySettings,
	pub environment: EnvironmentSettings,
}

/// Server configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ServerSettings {
	pub host: String,
	pub port: u16,
}

impl Default for ServerSettings {
	fn default() -> Self {
		Self {
			host: "0.0.0.0".to_string(),
			port: 8000,
		}
	}
}

/// Logging configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingSettings {
	pub level: String,
	pub format: LogFormat,
	/// Include targets and thread ids in log lines
	pub structured: bool,
}

impl Default for LoggingSettings {
	fn default() -> Self {
		Self {
			level: "info".to_string(),
			format: LogFormat::Pretty,
			structured: false,
		}
	}
}

/// Log format options
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
	Json,
	Pretty,
	Compact,
}

/// Query page size bounds
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct QuerySettings {
	pub default_limit: usize,
	pub max_limit: usize,
}

impl Default for QuerySettings {
	fn default() -> Self {
		Self {
			default_limit: 20,
			max_limit: 100,
		}
	}
}

/// Live event stream configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct EventSettings {
	/// Idle seconds before a heartbeat frame is sent
	pub heartbeat_secs: u64,
}

impl Default for EventSettings {
	fn default() -> Self {
		Self { heartbeat_secs: 15 }
	}
}

/// Security configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct SecuritySettings {
	/// Shared key required in the `x-api-key` header on every route except
	/// `/health`. Unset disables the check.
	///
	/// Example configurations:
	/// - Environment variable: `{"type": "env", "value": "VITALS_API_KEY"}`
	/// - Plain value: `{"type": "plain", "value": "your-key-here"}`
	pub api_key: Option<ConfigurableValue>,
}

/// Environment-specific settings
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct EnvironmentSettings {
	pub profile: EnvironmentProfile,
	pub debug: bool,
}

impl Default for EnvironmentSettings {
	fn default() -> Self {
		Self {
			profile: EnvironmentProfile::Development,
			debug: true,
		}
	}
}

/// Environment profiles
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentProfile {
	Development,
	Staging,
	Production,
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigValidationError {
	#[error("server.port must be non-zero")]
	InvalidPort,
	#[error("query limits must satisfy 1 <= default_limit ({default_limit}) <= max_limit ({max_limit})")]
	InvalidQueryLimits {
		default_limit: usize,
		max_limit: usize,
	},
	#[error("events.heartbeat_secs must be greater than zero")]
	InvalidHeartbeat,
}

impl Settings {
	/// Get server bind address
	pub fn bind_address(&self) -> String {
		format!("{}:{}", self.server.host, self.server.port)
	}

	/// Check if running in production
	pub fn is_production(&self) -> bool {
		self.environment.profile == EnvironmentProfile::Production
	}

	/// Check if debug mode is enabled
	pub fn is_debug(&self) -> bool {
		self.environment.debug && !self.is_production()
	}

	pub fn heartbeat_interval(&self) -> Duration {
		Duration::from_secs(self.events.heartbeat_secs)
	}

	pub fn validate(&self) -> Result<(), ConfigValidationError> {
		if self.server.port == 0 {
			return Err(ConfigValidationError::InvalidPort);
		}
		let QuerySettings {
			default_limit,
			max_limit,
		} = self.query;
		if default_limit == 0 || default_limit > max_limit {
			return Err(ConfigValidationError::InvalidQueryLimits {
				default_limit,
				max_limit,
			});
		}
		if self.events.heartbeat_secs == 0 {
			return Err(ConfigValidationError::InvalidHeartbeat);
		}
		Ok(())
	}

	/// Resolve the configured API key, if any
	pub fn resolve_api_key(&self) -> Result<Option<ApiKey>, ConfigurableValueError> {
		self.security
			.api_key
			.as_ref()
			.map(|value| value.resolve_for_secret())
			.transpose()
	}
}
