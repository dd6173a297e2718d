//! Configurable value types that can load from environment variables or plain values

use serde::{Deserialize, Serialize};
use std::fmt;
use vitals_types::ApiKey;

/// A configurable value that can be loaded from environment variables or used as plain text
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ConfigurableValue {
	/// Type of value: "env" for environment variable, "plain" for direct value
	#[serde(rename = "type")]
	pub value_type: ValueType,
	/// The value: either environment variable name or the actual value
	pub value: String,
}

/// Type of configurable value
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
	/// Load value from environment variable (name specified in `value` field)
	Env,
	/// Use the value directly from the `value` field
	Plain,
}

impl ConfigurableValue {
	pub fn from_env(env_var_name: &str) -> Self {
		Self {
			value_type: ValueType::Env,
			value: env_var_name.to_string(),
		}
	}

	pub fn from_plain(plain_value: &str) -> Self {
		Self {
			value_type: ValueType::Plain,
			value: plain_value.to_string(),
		}
	}

	/// Resolve the actual value based on the type
	pub fn resolve(&self) -> Result<String, ConfigurableValueError> {
		match self.value_type {
			ValueType::Env => std::env::var(&self.value).map_err(|_| {
				ConfigurableValueError::EnvironmentVariableNotFound(self.value.clone())
			}),
			ValueType::Plain => Ok(self.value.clone()),
		}
	}

	/// Resolve into an [`ApiKey`], rejecting an empty result
	pub fn resolve_for_secret(&self) -> Result<ApiKey, ConfigurableValueError> {
		let key = ApiKey::new(self.resolve()?);
		if key.is_empty() {
			return Err(ConfigurableValueError::Empty(self.description()));
		}
		Ok(key)
	}

	/// Get a description of this configurable value for logging
	pub fn description(&self) -> String {
		match self.value_type {
			ValueType::Env => format!("environment variable '{}'", self.value),
			ValueType::Plain => "configured plain value".to_string(),
		}
	}
}

/// Errors that can occur when resolving configurable values
#[derive(Debug, thiserror::Error)]
pub enum ConfigurableValueError {
	#[error("Environment variable '{0}' not found")]
	EnvironmentVariableNotFound(String),
	#[error("Resolved value from {0} is empty")]
	Empty(String),
}

// Never print plain values
impl fmt::Display for ConfigurableValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.value_type {
			ValueType::Env => write!(f, "env:{}", self.value),
			ValueType::Plain => write!(f, "plain:[REDACTED]"),
		}
	}
}

/// `env:NAME` selects an environment variable, anything else is plain
impl From<&str> for ConfigurableValue {
	fn from(value: &str) -> Self {
		if let Some(env_var) = value.strip_prefix("env:") {
			Self::from_env(env_var)
		} else {
			Self::from_plain(value)
		}
	}
}

impl From<String> for ConfigurableValue {
	fn from(value: String) -> Self {
		ConfigurableValue::from(value.as_str())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::env;

	#[test]
	fn test_plain_value() {
		let config = ConfigurableValue::from_plain("test-key");
		assert_eq!(config.value_type, ValueType::Plain);
		assert_eq!(config.resolve().unwrap(), "test-key");
	}

	#[test]
	fn test_env_value() {
		env::set_var("VITALS_TEST_API_KEY", "key-from-env");

		let config = ConfigurableValue::from_env("VITALS_TEST_API_KEY");
		assert_eq!(config.value_type, ValueType::Env);
		assert_eq!(config.resolve_for_secret().unwrap().expose(), "key-from-env");

		env::remove_var("VITALS_TEST_API_KEY");
	}

	#[test]
	fn test_env_value_not_found() {
		let config = ConfigurableValue::from_env("VITALS_NON_EXISTENT_VAR");
		assert!(matches!(
			config.resolve(),
			Err(ConfigurableValueError::EnvironmentVariableNotFound(_))
		));
	}

	#[test]
	fn test_empty_secret_is_rejected() {
		let config = ConfigurableValue::from_plain("");
		assert!(matches!(
			config.resolve_for_secret(),
			Err(ConfigurableValueError::Empty(_))
		));
	}

	#[test]
	fn test_from_string_conversion() {
		let plain_config = ConfigurableValue::from("plain-value");
		assert_eq!(plain_config.value_type, ValueType::Plain);

		let env_config = ConfigurableValue::from("env:MY_KEY");
		assert_eq!(env_config.value_type, ValueType::Env);
		assert_eq!(env_config.value, "MY_KEY");
	}

	#[test]
	fn test_display_hides_plain_values() {
		assert_eq!(
			ConfigurableValue::from_plain("secret").to_string(),
			"plain:[REDACTED]"
		);
		assert_eq!(ConfigurableValue::from_env("MY_KEY").to_string(), "env:MY_KEY");
		assert_eq!(
			ConfigurableValue::from_env("MY_KEY").description(),
			"environment variable 'MY_KEY'"
		);
	}

	#[test]
	fn test_serde_shape() {
		let json = serde_json::to_string(&ConfigurableValue::from_env("MY_KEY")).unwrap();
		assert!(json.contains("\"type\":\"env\""));
		let back: ConfigurableValue = serde_json::from_str(&json).unwrap();
		assert_eq!(back.value, "MY_KEY");
	}
}
