//! Notification dispatch module for the Birdie order system.
//!
//! This module handles composition and delivery of status-change SMS
//! notifications. It provides the status-to-template mapping and an
//! abstraction over messaging providers, so the workflow can run against
//! the real gateway or a substitute in tests.

use async_trait::async_trait;
use birdie_types::{status, ConfigSchema, ImplementationRegistry, Order, SmsMessage};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod log;
	pub mod messagebird;
}

/// Brand name interpolated into the confirmation template.
const BRAND: &str = "BirdieNomNom Foods";

/// Errors that can occur during notification dispatch.
#[derive(Debug, Error)]
pub enum NotifyError {
	/// Error reported by the messaging provider, carrying its detail.
	#[error("Provider error: {0}")]
	Provider(String),
	/// Error that occurs during network communication with the provider.
	#[error("Network error: {0}")]
	Network(String),
	/// Error that occurs during configuration validation.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Composes the SMS body for an order's new status.
///
/// Pure mapping from the new status value to a templated string that
/// interpolates the customer name. Unrecognized statuses yield an empty
/// string; the dispatcher submits that empty body unchanged, matching the
/// long-standing behavior of this workflow.
pub fn compose_message(order: &Order, new_status: &str) -> String {
	match new_status {
		status::CONFIRMED => format!(
			"{}, thanks for ordering at {}! We are now preparing your food \
			 with love and fresh ingredients and will keep you updated.",
			order.name, BRAND
		),
		status::DELAYED => format!(
			"{}, sometimes good things take time! Unfortunately your order \
			 is slightly delayed but will be delivered as soon as possible.",
			order.name
		),
		status::DELIVERED => format!(
			"{}, you can start setting the table! Our driver is on their \
			 way with your order! Bon appetit!",
			order.name
		),
		_ => String::new(),
	}
}

/// Trait defining the interface for messaging providers.
///
/// This trait must be implemented by any provider that wants to integrate
/// with the order service. A provider submits a composed message to the
/// external gateway and surfaces failures as explicit errors.
#[async_trait]
pub trait NotifyInterface: Send + Sync {
	/// Returns the configuration schema for this provider implementation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Submits a message to the gateway.
	///
	/// Empty bodies are submitted as-is; whether the provider accepts them
	/// is its own concern.
	async fn send(&self, message: &SmsMessage) -> Result<(), NotifyError>;
}

/// Type alias for notify provider factory functions.
pub type NotifyFactory = fn(&toml::Value) -> Result<Box<dyn NotifyInterface>, NotifyError>;

/// Registry trait for notify provider implementations.
pub trait NotifyProviderRegistry: ImplementationRegistry<Factory = NotifyFactory> {}

/// Get all registered notify provider implementations.
///
/// Returns a vector of (name, factory) tuples for all available providers.
/// Used by the service binary to build its factory map.
pub fn get_all_implementations() -> Vec<(&'static str, NotifyFactory)> {
	use implementations::{log, messagebird};

	vec![
		(
			messagebird::Registry::NAME,
			messagebird::Registry::factory(),
		),
		(log::Registry::NAME, log::Registry::factory()),
	]
}

/// Service that dispatches status notifications through a provider.
///
/// The NotifyService wraps a boxed provider and carries the configured
/// originator (the sender identity shown to the recipient).
pub struct NotifyService {
	/// The underlying provider implementation.
	provider: Box<dyn NotifyInterface>,
	/// Sender identity shown to SMS recipients.
	originator: String,
}

impl NotifyService {
	/// Creates a new NotifyService with the specified provider and
	/// originator.
	pub fn new(provider: Box<dyn NotifyInterface>, originator: String) -> Self {
		Self {
			provider,
			originator,
		}
	}

	/// Returns the configured originator.
	pub fn originator(&self) -> &str {
		&self.originator
	}

	/// Sends a status notification to a single recipient.
	///
	/// Builds the provider message from the configured originator and
	/// submits it. The body is passed through untouched, including the
	/// empty body produced for unrecognized statuses.
	pub async fn send_status_notification(
		&self,
		recipient: &str,
		body: String,
	) -> Result<(), NotifyError> {
		let message =
			SmsMessage::to_recipient(self.originator.clone(), recipient.to_string(), body);
		self.provider.send(&message).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use birdie_types::Order;

	fn order(name: &str) -> Order {
		Order {
			id: 1,
			name: name.to_string(),
			phone: "+319876543210".to_string(),
			items: "1 x Hipster Burger + Fries".to_string(),
			status: "pending".to_string(),
		}
	}

	#[test]
	fn test_confirmed_template() {
		let body = compose_message(&order("Hannah Hungry"), "confirmed");
		assert!(body.starts_with("Hannah Hungry, thanks for ordering at"));
		assert!(body.contains("BirdieNomNom Foods"));
	}

	#[test]
	fn test_delayed_template() {
		let body = compose_message(&order("Mike Madeater"), "delayed");
		assert!(body.starts_with("Mike Madeater, sometimes good things take time!"));
	}

	#[test]
	fn test_delivered_template() {
		let body = compose_message(&order("Hannah Hungry"), "delivered");
		assert!(body.starts_with("Hannah Hungry, you can start setting the table!"));
		assert!(body.ends_with("Bon appetit!"));
	}

	#[test]
	fn test_recognized_statuses_interpolate_name() {
		for status in ["confirmed", "delayed", "delivered"] {
			let body = compose_message(&order("Hannah Hungry"), status);
			assert!(!body.is_empty(), "empty body for {}", status);
			assert!(body.contains("Hannah Hungry"), "name missing for {}", status);
			assert!(!body.contains('{'), "unresolved placeholder for {}", status);
		}
	}

	#[test]
	fn test_unrecognized_status_yields_empty_body() {
		for status in ["pending", "archived", ""] {
			assert_eq!(compose_message(&order("Hannah Hungry"), status), "");
		}
	}
}
