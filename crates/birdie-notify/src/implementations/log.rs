//! Log-only provider implementation for the order service.
//!
//! This module provides a development implementation of the
//! NotifyInterface trait that records the would-be SMS in the service log
//! instead of calling the external gateway.

use crate::{NotifyError, NotifyFactory, NotifyInterface, NotifyProviderRegistry};
use async_trait::async_trait;
use birdie_types::{ConfigSchema, ImplementationRegistry, Schema, SmsMessage, ValidationError};

/// Log-only notify provider.
///
/// Every send succeeds; the message content is written to the log so the
/// workflow can be exercised without a provider account.
pub struct LogNotifier;

impl LogNotifier {
	/// Creates a new LogNotifier instance.
	pub fn new() -> Self {
		Self
	}
}

impl Default for LogNotifier {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl NotifyInterface for LogNotifier {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(LogNotifierSchema)
	}

	async fn send(&self, message: &SmsMessage) -> Result<(), NotifyError> {
		tracing::info!(
			originator = %message.originator,
			recipients = ?message.recipients,
			body = %message.body,
			"Would send SMS"
		);
		Ok(())
	}
}

/// Configuration schema for LogNotifier.
pub struct LogNotifierSchema;

impl ConfigSchema for LogNotifierSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		// The log provider has no required configuration
		let schema = Schema::new(vec![], vec![]);
		schema.validate(config)
	}
}

/// Registry for the log provider implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "log";
	type Factory = NotifyFactory;

	fn factory() -> Self::Factory {
		create_notifier
	}
}

impl NotifyProviderRegistry for Registry {}

/// Factory function to create a log provider from configuration.
///
/// Configuration parameters:
/// - None required for the log provider
pub fn create_notifier(_config: &toml::Value) -> Result<Box<dyn NotifyInterface>, NotifyError> {
	Ok(Box::new(LogNotifier::new()))
}
