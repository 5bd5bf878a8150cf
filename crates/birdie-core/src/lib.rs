//! Core engine for the Birdie order system.
//!
//! This module provides the orchestration logic for the status-update
//! workflow, coordinating the order store and the notification dispatcher:
//! look the order up, persist the new status, compose the status message,
//! and submit it to the messaging provider. It also includes the builder
//! that assembles an engine from configuration and factory maps.

use birdie_config::Config;
use birdie_notify::{compose_message, NotifyError, NotifyFactory, NotifyService};
use birdie_store::{StoreError, StoreFactory, StoreService};
use birdie_types::{Order, OrderId};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::instrument;

/// Errors that can occur during engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
	/// The requested order id does not exist.
	#[error("Order not found")]
	OrderNotFound,
	/// Error related to configuration issues.
	#[error("Configuration error: {0}")]
	Config(String),
	/// Error from the order store.
	#[error("Storage error: {0}")]
	Store(StoreError),
	/// Error from the notification dispatcher. The order's status update
	/// has already been committed when this is returned.
	#[error("Notification error: {0}")]
	Notify(#[from] NotifyError),
}

/// Maps a store error, promoting NotFound to the engine's own variant.
fn store_err(err: StoreError) -> EngineError {
	match err {
		StoreError::NotFound => EngineError::OrderNotFound,
		other => EngineError::Store(other),
	}
}

/// Engine that runs the order listing and status-update workflows.
///
/// The Engine coordinates two services:
/// - Store: durable order rows
/// - Notifier: status-change SMS dispatch
pub struct Engine {
	/// Service configuration.
	config: Config,
	/// Order store service.
	store: Arc<StoreService>,
	/// Notification dispatch service.
	notifier: Arc<NotifyService>,
}

impl Engine {
	/// Creates an engine from already-constructed services.
	pub fn new(config: Config, store: Arc<StoreService>, notifier: Arc<NotifyService>) -> Self {
		Self {
			config,
			store,
			notifier,
		}
	}

	/// Returns a reference to the configuration.
	pub fn config(&self) -> &Config {
		&self.config
	}

	/// Returns all orders.
	pub async fn list_orders(&self) -> Result<Vec<Order>, EngineError> {
		self.store.list_orders().await.map_err(store_err)
	}

	/// Returns a single order by id.
	pub async fn order_by_id(&self, id: OrderId) -> Result<Order, EngineError> {
		self.store.order_by_id(id).await.map_err(store_err)
	}

	/// Runs the status-update workflow.
	///
	/// This method:
	/// 1. Looks the order up; an unknown id fails before any write
	/// 2. Persists the new status
	/// 3. Composes the status message from the new value
	/// 4. Submits it to the messaging provider
	///
	/// The update is not rolled back when the send fails: the caller gets
	/// `EngineError::Notify` while the row keeps its new status.
	#[instrument(skip(self), fields(order_id = %id, status = %new_status))]
	pub async fn update_order_status(
		&self,
		id: OrderId,
		new_status: &str,
	) -> Result<Order, EngineError> {
		let order = self.store.order_by_id(id).await.map_err(store_err)?;

		let updated = self
			.store
			.update_status(id, new_status)
			.await
			.map_err(store_err)?;

		// Composed from the pre-update row; only immutable fields are
		// interpolated. Unrecognized statuses produce an empty body that
		// is still submitted.
		let body = compose_message(&order, new_status);

		if let Err(e) = self
			.notifier
			.send_status_notification(&order.phone, body)
			.await
		{
			tracing::error!(error = %e, "Failed to send status notification");
			return Err(e.into());
		}

		tracing::info!("Order status updated and customer notified");
		Ok(updated)
	}
}

/// Factory maps for the pluggable implementations.
///
/// The service binary registers every available storage backend and notify
/// provider here; the builder picks the ones named in the configuration.
pub struct EngineFactories {
	/// Storage backend factories by configuration name.
	pub store_factories: HashMap<String, StoreFactory>,
	/// Notify provider factories by configuration name.
	pub notify_factories: HashMap<String, NotifyFactory>,
}

/// Builder for constructing an Engine with pluggable implementations.
///
/// The builder looks up the configured primary implementation in each
/// factory map, creates it from its raw TOML section, validates that
/// section against the implementation's schema, and wires the services.
pub struct EngineBuilder {
	config: Config,
}

impl EngineBuilder {
	/// Creates a new EngineBuilder with the given configuration.
	pub fn new(config: Config) -> Self {
		Self { config }
	}

	/// Builds the Engine using the provided factories.
	///
	/// This method:
	/// 1. Creates the primary storage backend and runs its one-time setup
	/// 2. Creates the primary notify provider
	/// 3. Returns a fully configured Engine
	pub async fn build(self, factories: EngineFactories) -> Result<Engine, EngineError> {
		// Create storage backend
		let store_name = &self.config.storage.primary;
		let store_config = self
			.config
			.storage
			.implementations
			.get(store_name)
			.ok_or_else(|| {
				EngineError::Config(format!("Storage '{}' has no configuration", store_name))
			})?;
		let store_factory = factories.store_factories.get(store_name).ok_or_else(|| {
			EngineError::Config(format!("Unknown storage implementation '{}'", store_name))
		})?;
		let store_backend = store_factory(store_config).map_err(|e| {
			EngineError::Config(format!(
				"Failed to create storage backend '{}': {}",
				store_name, e
			))
		})?;
		store_backend
			.config_schema()
			.validate(store_config)
			.map_err(|e| {
				EngineError::Config(format!(
					"Invalid configuration for storage '{}': {}",
					store_name, e
				))
			})?;
		let store = Arc::new(StoreService::new(store_backend));
		store.init().await.map_err(EngineError::Store)?;
		tracing::info!(component = "storage", implementation = %store_name, "Loaded");

		// Create notify provider
		let notify_name = &self.config.notifier.primary;
		let notify_config = self
			.config
			.notifier
			.implementations
			.get(notify_name)
			.ok_or_else(|| {
				EngineError::Config(format!("Notifier '{}' has no configuration", notify_name))
			})?;
		let notify_factory = factories.notify_factories.get(notify_name).ok_or_else(|| {
			EngineError::Config(format!("Unknown notify provider '{}'", notify_name))
		})?;
		let provider = notify_factory(notify_config).map_err(|e| {
			EngineError::Config(format!(
				"Failed to create notify provider '{}': {}",
				notify_name, e
			))
		})?;
		provider
			.config_schema()
			.validate(notify_config)
			.map_err(|e| {
				EngineError::Config(format!(
					"Invalid configuration for notify provider '{}': {}",
					notify_name, e
				))
			})?;
		let notifier = Arc::new(NotifyService::new(
			provider,
			self.config.notifier.originator.clone(),
		));
		tracing::info!(component = "notifier", implementation = %notify_name, "Loaded");

		Ok(Engine::new(self.config, store, notifier))
	}
}
