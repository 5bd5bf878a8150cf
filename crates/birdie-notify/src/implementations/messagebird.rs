//! MessageBird provider implementation for the order service.
//!
//! This module provides the production implementation of the
//! NotifyInterface trait, submitting messages to the MessageBird REST API
//! over HTTPS with an account API key.

use crate::{NotifyError, NotifyFactory, NotifyInterface, NotifyProviderRegistry};
use async_trait::async_trait;
use birdie_types::{
	ConfigSchema, Field, FieldType, ImplementationRegistry, Schema, SecretString, SmsMessage,
	ValidationError,
};
use serde::Deserialize;

/// Base URL of the MessageBird REST API.
const DEFAULT_ENDPOINT: &str = "https://rest.messagebird.com";

/// Default request timeout in seconds. The gateway call otherwise has no
/// cancellation semantics, so the HTTP client enforces the bound.
const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Error body returned by the MessageBird API on failed requests.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
	#[serde(default)]
	errors: Vec<ApiErrorDetail>,
}

/// A single error entry in a MessageBird error body.
#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
	#[serde(default)]
	description: String,
}

/// MessageBird-backed notify provider.
///
/// Submits each message with a single POST to `/messages`, authenticated
/// with the account API key. Provider rejections are decoded from the
/// response body and surfaced with their human-readable description.
pub struct MessageBirdNotifier {
	/// HTTP client with the configured request timeout.
	client: reqwest::Client,
	/// API base URL; overridable for self-hosted test gateways.
	endpoint: String,
	/// Account API key.
	api_key: SecretString,
}

impl MessageBirdNotifier {
	/// Creates a new MessageBirdNotifier.
	pub fn new(
		api_key: SecretString,
		endpoint: String,
		timeout_seconds: u64,
	) -> Result<Self, NotifyError> {
		let client = reqwest::Client::builder()
			.timeout(std::time::Duration::from_secs(timeout_seconds))
			.build()
			.map_err(|e| NotifyError::Network(format!("Failed to build HTTP client: {}", e)))?;

		Ok(Self {
			client,
			endpoint,
			api_key,
		})
	}
}

/// Decodes a non-success response body into a provider error.
///
/// The API reports failures as `{"errors": [{"description": ...}]}`; when
/// the body does not match that shape, the raw status and body are kept so
/// the log still carries the detail.
fn provider_error(status: reqwest::StatusCode, body: &str) -> NotifyError {
	match serde_json::from_str::<ApiErrorBody>(body) {
		Ok(parsed) if !parsed.errors.is_empty() => {
			let descriptions: Vec<&str> = parsed
				.errors
				.iter()
				.map(|e| e.description.as_str())
				.collect();
			NotifyError::Provider(descriptions.join("; "))
		},
		_ => NotifyError::Provider(format!("HTTP {}: {}", status, body)),
	}
}

#[async_trait]
impl NotifyInterface for MessageBirdNotifier {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(MessageBirdSchema)
	}

	async fn send(&self, message: &SmsMessage) -> Result<(), NotifyError> {
		let url = format!("{}/messages", self.endpoint);

		let response = self
			.client
			.post(&url)
			.header(
				reqwest::header::AUTHORIZATION,
				format!("AccessKey {}", self.api_key.expose_secret()),
			)
			.json(message)
			.send()
			.await
			.map_err(|e| NotifyError::Network(e.to_string()))?;

		let status = response.status();
		if status.is_success() {
			tracing::debug!(
				recipients = message.recipients.len(),
				"Submitted message to provider"
			);
			return Ok(());
		}

		let body = response
			.text()
			.await
			.map_err(|e| NotifyError::Network(e.to_string()))?;

		Err(provider_error(status, &body))
	}
}

/// Configuration schema for MessageBirdNotifier.
pub struct MessageBirdSchema;

impl ConfigSchema for MessageBirdSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			// Required fields
			vec![
				Field::new("api_key", FieldType::String).with_validator(|value| {
					match value.as_str() {
						Some(s) if !s.is_empty() => Ok(()),
						_ => Err("api_key cannot be empty".to_string()),
					}
				}),
			],
			// Optional fields
			vec![
				Field::new("endpoint", FieldType::String),
				Field::new(
					"timeout_seconds",
					FieldType::Integer {
						min: Some(1),
						max: Some(300),
					},
				),
			],
		);

		schema.validate(config)
	}
}

/// Registry for the MessageBird provider implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "messagebird";
	type Factory = NotifyFactory;

	fn factory() -> Self::Factory {
		create_notifier
	}
}

impl NotifyProviderRegistry for Registry {}

/// Factory function to create a MessageBird provider from configuration.
///
/// Configuration parameters:
/// - `api_key`: MessageBird account API key (required; supplied through
///   the process environment in the shipped configuration)
/// - `endpoint`: API base URL (default: https://rest.messagebird.com)
/// - `timeout_seconds`: Request timeout (default: 30)
pub fn create_notifier(config: &toml::Value) -> Result<Box<dyn NotifyInterface>, NotifyError> {
	let api_key = config
		.get("api_key")
		.and_then(|v| v.as_str())
		.ok_or_else(|| NotifyError::Configuration("api_key is required".to_string()))?;

	let endpoint = config
		.get("endpoint")
		.and_then(|v| v.as_str())
		.unwrap_or(DEFAULT_ENDPOINT)
		.to_string();

	let timeout_seconds = config
		.get("timeout_seconds")
		.and_then(|v| v.as_integer())
		.map(|v| v as u64)
		.unwrap_or(DEFAULT_TIMEOUT_SECONDS);

	Ok(Box::new(MessageBirdNotifier::new(
		SecretString::from(api_key),
		endpoint,
		timeout_seconds,
	)?))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_config_schema() {
		let schema = MessageBirdSchema;

		let valid: toml::Value = toml::Value::Table("api_key = \"live_abc\"".parse().unwrap());
		assert!(schema.validate(&valid).is_ok());

		let empty_key: toml::Value = toml::Value::Table("api_key = \"\"".parse().unwrap());
		assert!(schema.validate(&empty_key).is_err());

		let missing_key: toml::Value =
			toml::Value::Table("endpoint = \"http://localhost\"".parse().unwrap());
		assert!(schema.validate(&missing_key).is_err());

		let bad_timeout: toml::Value = toml::Value::Table(
			"api_key = \"live_abc\"\ntimeout_seconds = 0"
				.parse()
				.unwrap(),
		);
		assert!(schema.validate(&bad_timeout).is_err());
	}

	#[test]
	fn test_factory_requires_api_key() {
		let config: toml::Value =
			toml::Value::Table("endpoint = \"http://localhost\"".parse().unwrap());
		let result = create_notifier(&config);
		assert!(matches!(result, Err(NotifyError::Configuration(_))));
	}

	#[test]
	fn test_factory_defaults() {
		let config: toml::Value = toml::Value::Table("api_key = \"live_abc\"".parse().unwrap());
		assert!(create_notifier(&config).is_ok());
	}

	#[test]
	fn test_message_payload_shape() {
		let message = SmsMessage::to_recipient(
			"BirdieNomNo".to_string(),
			"+319876543210".to_string(),
			"body text".to_string(),
		);

		let value = serde_json::to_value(&message).unwrap();
		assert_eq!(value["originator"], "BirdieNomNo");
		assert_eq!(value["recipients"][0], "+319876543210");
		assert_eq!(value["body"], "body text");
	}

	#[test]
	fn test_provider_error_decodes_descriptions() {
		let body = r#"{"errors":[{"code":2,"description":"Request not allowed (incorrect access_key)","parameter":"access_key"}]}"#;
		let err = provider_error(reqwest::StatusCode::UNAUTHORIZED, body);
		match err {
			NotifyError::Provider(detail) => {
				assert_eq!(detail, "Request not allowed (incorrect access_key)")
			},
			other => panic!("unexpected error: {:?}", other),
		}
	}

	#[test]
	fn test_provider_error_keeps_unparseable_body() {
		let err = provider_error(reqwest::StatusCode::BAD_GATEWAY, "upstream down");
		match err {
			NotifyError::Provider(detail) => {
				assert!(detail.contains("502"));
				assert!(detail.contains("upstream down"));
			},
			other => panic!("unexpected error: {:?}", other),
		}
	}
}
