//! Configuration module for the Birdie order system.
//!
//! This module provides structures and utilities for managing service
//! configuration. It supports loading configuration from TOML files,
//! resolving `${VAR}` environment-variable references (the messaging
//! provider's API key arrives this way), and validating that all required
//! configuration values are properly set.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Extract just the message without the huge input dump
		let message = err.message().to_string();
		ConfigError::Parse(message)
	}
}

/// Main configuration structure for the Birdie order service.
///
/// Contains all configuration sections required for the service to
/// operate: service identity, order storage, notification dispatch, and
/// the HTTP server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Configuration specific to this service instance.
	pub service: ServiceConfig,
	/// Configuration for the order storage backend.
	pub storage: StorageConfig,
	/// Configuration for the notification dispatcher.
	pub notifier: NotifierConfig,
	/// Configuration for the HTTP server.
	pub api: ApiConfig,
}

/// Configuration specific to this service instance.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
	/// Unique identifier for this service instance.
	pub id: String,
}

/// Configuration for the order storage backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of storage implementation names to their configurations.
	/// Each implementation has its own configuration format stored as raw
	/// TOML values, validated by the implementation's schema.
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for the notification dispatcher.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotifierConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Sender identity shown to SMS recipients.
	pub originator: String,
	/// Map of notify provider names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
	/// Host address to bind the server to.
	#[serde(default = "default_api_host")]
	pub host: String,
	/// Port to bind the server to.
	#[serde(default = "default_api_port")]
	pub port: u16,
}

/// Returns the default API host.
fn default_api_host() -> String {
	"127.0.0.1".to_string()
}

/// Returns the default API port.
fn default_api_port() -> u16 {
	3000
}

/// Alphanumeric SMS originators are limited to 11 characters by the
/// messaging provider.
const MAX_ORIGINATOR_LEN: usize = 11;

/// Resolves environment variables in a string.
///
/// Replaces ${VAR_NAME} with the value of the environment variable VAR_NAME.
/// Supports default values with ${VAR_NAME:-default_value}.
///
/// Input strings are limited to 1MB to prevent ReDoS attacks.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024; // 1MB
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = input.to_string();
	let mut replacements = Vec::new();

	for cap in re.captures_iter(input) {
		let full_match = cap.get(0).unwrap();
		let var_name = cap.get(1).unwrap().as_str();
		let default_value = cap.get(2).map(|m| m.as_str());

		let value = match std::env::var(var_name) {
			Ok(v) => v,
			Err(_) => {
				if let Some(default) = default_value {
					default.to_string()
				} else {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name
					)));
				}
			},
		};

		replacements.push((full_match.start(), full_match.end(), value));
	}

	// Apply replacements in reverse order to maintain positions
	for (start, end, value) in replacements.iter().rev() {
		result.replace_range(start..end, value);
	}

	Ok(result)
}

impl Config {
	/// Loads configuration from a file.
	///
	/// Environment variables are resolved and the configuration is
	/// validated after parsing.
	pub async fn from_file(path: &str) -> Result<Self, ConfigError> {
		let contents = tokio::fs::read_to_string(path).await?;
		contents.parse()
	}

	/// Validates the configuration to ensure all required fields are
	/// properly set.
	///
	/// This method checks:
	/// - Service id is not empty
	/// - At least one storage implementation exists and primary names one
	/// - At least one notify provider exists and primary names one
	/// - The originator fits the provider's sender-identity limit
	/// - The API port is non-zero
	fn validate(&self) -> Result<(), ConfigError> {
		// Validate service config
		if self.service.id.is_empty() {
			return Err(ConfigError::Validation("Service id cannot be empty".into()));
		}

		// Validate storage config
		if self.storage.implementations.is_empty() {
			return Err(ConfigError::Validation(
				"At least one storage implementation must be configured".into(),
			));
		}
		if self.storage.primary.is_empty() {
			return Err(ConfigError::Validation(
				"Storage primary implementation cannot be empty".into(),
			));
		}
		if !self
			.storage
			.implementations
			.contains_key(&self.storage.primary)
		{
			return Err(ConfigError::Validation(format!(
				"Primary storage '{}' not found in implementations",
				self.storage.primary
			)));
		}

		// Validate notifier config
		if self.notifier.implementations.is_empty() {
			return Err(ConfigError::Validation(
				"At least one notify provider must be configured".into(),
			));
		}
		if self.notifier.primary.is_empty() {
			return Err(ConfigError::Validation(
				"Notifier primary implementation cannot be empty".into(),
			));
		}
		if !self
			.notifier
			.implementations
			.contains_key(&self.notifier.primary)
		{
			return Err(ConfigError::Validation(format!(
				"Primary notify provider '{}' not found in implementations",
				self.notifier.primary
			)));
		}
		if self.notifier.originator.is_empty() {
			return Err(ConfigError::Validation(
				"Notifier originator cannot be empty".into(),
			));
		}
		if self.notifier.originator.len() > MAX_ORIGINATOR_LEN {
			return Err(ConfigError::Validation(format!(
				"Notifier originator '{}' exceeds {} characters",
				self.notifier.originator, MAX_ORIGINATOR_LEN
			)));
		}

		// Validate API config
		if self.api.port == 0 {
			return Err(ConfigError::Validation("API port cannot be 0".into()));
		}

		Ok(())
	}
}

/// Implementation of FromStr trait for Config to enable parsing from string.
///
/// Environment variables are resolved and the configuration is
/// automatically validated after parsing.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const VALID_CONFIG: &str = r#"
[service]
id = "birdie-orders"

[storage]
primary = "sqlite"
[storage.implementations.sqlite]
path = "orders.sqlite"

[notifier]
primary = "messagebird"
originator = "BirdieNomNo"
[notifier.implementations.messagebird]
api_key = "test_key"

[api]
host = "127.0.0.1"
port = 3000
"#;

	#[test]
	fn test_env_var_resolution() {
		std::env::set_var("TEST_BIRDIE_HOST", "localhost");
		std::env::set_var("TEST_BIRDIE_PORT", "5432");

		let input = "host = \"${TEST_BIRDIE_HOST}:${TEST_BIRDIE_PORT}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "host = \"localhost:5432\"");

		std::env::remove_var("TEST_BIRDIE_HOST");
		std::env::remove_var("TEST_BIRDIE_PORT");
	}

	#[test]
	fn test_env_var_with_default() {
		let input = "value = \"${MISSING_VAR:-default_value}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "value = \"default_value\"");
	}

	#[test]
	fn test_missing_env_var_error() {
		let input = "value = \"${MISSING_VAR}\"";
		let result = resolve_env_vars(input);
		assert!(result.is_err());
		assert!(result.unwrap_err().to_string().contains("MISSING_VAR"));
	}

	#[test]
	fn test_valid_config_parses() {
		let config: Config = VALID_CONFIG.parse().unwrap();
		assert_eq!(config.service.id, "birdie-orders");
		assert_eq!(config.storage.primary, "sqlite");
		assert_eq!(config.notifier.primary, "messagebird");
		assert_eq!(config.notifier.originator, "BirdieNomNo");
		assert_eq!(config.api.port, 3000);
	}

	#[test]
	fn test_api_key_from_env() {
		std::env::set_var("TEST_BIRDIE_API_KEY", "live_abc123");

		let config_str = VALID_CONFIG.replace("test_key", "${TEST_BIRDIE_API_KEY}");
		let config: Config = config_str.parse().unwrap();
		let section = &config.notifier.implementations["messagebird"];
		assert_eq!(
			section.get("api_key").and_then(|v| v.as_str()),
			Some("live_abc123")
		);

		std::env::remove_var("TEST_BIRDIE_API_KEY");
	}

	#[test]
	fn test_empty_service_id_rejected() {
		let config_str = VALID_CONFIG.replace("id = \"birdie-orders\"", "id = \"\"");
		let result = Config::from_str(&config_str);
		assert!(result.is_err());
		assert!(result
			.unwrap_err()
			.to_string()
			.contains("Service id cannot be empty"));
	}

	#[test]
	fn test_unknown_primary_storage_rejected() {
		let config_str = VALID_CONFIG.replace("primary = \"sqlite\"", "primary = \"postgres\"");
		let result = Config::from_str(&config_str);
		assert!(result.is_err());
		assert!(result
			.unwrap_err()
			.to_string()
			.contains("Primary storage 'postgres' not found"));
	}

	#[test]
	fn test_unknown_primary_notifier_rejected() {
		let config_str =
			VALID_CONFIG.replace("primary = \"messagebird\"", "primary = \"twilio\"");
		let result = Config::from_str(&config_str);
		assert!(result.is_err());
		assert!(result
			.unwrap_err()
			.to_string()
			.contains("Primary notify provider 'twilio' not found"));
	}

	#[test]
	fn test_overlong_originator_rejected() {
		let config_str = VALID_CONFIG.replace("BirdieNomNo", "BirdieNomNomFoods");
		let result = Config::from_str(&config_str);
		assert!(result.is_err());
		assert!(result.unwrap_err().to_string().contains("exceeds 11"));
	}

	#[test]
	fn test_api_defaults() {
		let config_str = VALID_CONFIG.replace("host = \"127.0.0.1\"\nport = 3000", "");
		let config: Config = config_str.parse().unwrap();
		assert_eq!(config.api.host, "127.0.0.1");
		assert_eq!(config.api.port, 3000);
	}

	#[tokio::test]
	async fn test_from_file() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("config.toml");
		std::fs::write(&path, VALID_CONFIG).unwrap();

		let config = Config::from_file(path.to_str().unwrap()).await.unwrap();
		assert_eq!(config.service.id, "birdie-orders");
	}
}
