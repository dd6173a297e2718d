//! Vitals Configuration
//!
//! Settings loading, validation and startup logging for Vitals Hub.

pub mod configurable_value;
pub mod loader;
pub mod settings;
pub mod startup_logger;

pub use configurable_value::{ConfigurableValue, ConfigurableValueError, ValueType};
pub use loader::{load_config, ConfigLoadError};
pub use settings::{
	ConfigValidationError, EnvironmentProfile, EnvironmentSettings, EventSettings, LogFormat,
	LoggingSettings, QuerySettings, SecuritySettings, ServerSettings, Settings,
};
pub use startup_logger::{log_service_info, log_service_shutdown, log_startup_complete};
