//! Order storage module for the Birdie order system.
//!
//! This module provides abstractions for durable storage and retrieval of
//! order rows, supporting different backend implementations such as SQLite
//! or in-memory storage.

use async_trait::async_trait;
use birdie_types::{ConfigSchema, ImplementationRegistry, NewOrder, Order, OrderId};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod memory;
	pub mod sqlite;
}

/// Errors that can occur during order storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
	/// Error that occurs when a requested order is not found.
	#[error("Not found")]
	NotFound,
	/// Error that occurs in the storage backend.
	#[error("Backend error: {0}")]
	Backend(String),
	/// Error that occurs during configuration validation.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Trait defining the interface for order storage backends.
///
/// This trait must be implemented by any storage backend that wants to
/// integrate with the order service. Backends own their schema setup and
/// expose the row operations of the status-update workflow.
#[async_trait]
pub trait StoreInterface: Send + Sync {
	/// Returns the configuration schema for validation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// One-time backend setup, such as schema creation and seeding.
	///
	/// Called once by the engine builder before the backend is used.
	async fn init(&self) -> Result<(), StoreError> {
		Ok(())
	}

	/// Returns all order rows. Order unspecified; read-only.
	async fn list_orders(&self) -> Result<Vec<Order>, StoreError>;

	/// Fetches a single order by primary key.
	///
	/// Fails with `StoreError::NotFound` when no row matches.
	async fn order_by_id(&self, id: OrderId) -> Result<Order, StoreError>;

	/// Sets the status of the order with the given id and returns the
	/// updated row.
	///
	/// The id is checked via a lookup before the write, so a missing row
	/// fails with `StoreError::NotFound` without mutating the store.
	async fn update_status(&self, id: OrderId, status: &str) -> Result<Order, StoreError>;

	/// Inserts a new order and returns the stored row with its assigned id.
	async fn insert_order(&self, order: NewOrder) -> Result<Order, StoreError>;
}

/// Type alias for store factory functions.
///
/// This is the function signature that all storage implementations must
/// provide to create instances of their store interface.
pub type StoreFactory = fn(&toml::Value) -> Result<Box<dyn StoreInterface>, StoreError>;

/// Registry trait for storage implementations.
///
/// This trait extends the base ImplementationRegistry to specify that
/// storage implementations must provide a StoreFactory.
pub trait StoreRegistry: ImplementationRegistry<Factory = StoreFactory> {}

/// Get all registered storage implementations.
///
/// Returns a vector of (name, factory) tuples for all available storage
/// implementations. Used by the service binary to build its factory map.
pub fn get_all_implementations() -> Vec<(&'static str, StoreFactory)> {
	use implementations::{memory, sqlite};

	vec![
		(sqlite::Registry::NAME, sqlite::Registry::factory()),
		(memory::Registry::NAME, memory::Registry::factory()),
	]
}

/// High-level store service wrapping a storage backend.
///
/// The StoreService wraps a boxed backend and is the handle the engine
/// holds; tests substitute the in-memory backend through the same seam.
pub struct StoreService {
	/// The underlying storage backend implementation.
	backend: Box<dyn StoreInterface>,
}

impl StoreService {
	/// Creates a new StoreService with the specified backend.
	pub fn new(backend: Box<dyn StoreInterface>) -> Self {
		Self { backend }
	}

	/// Runs the backend's one-time setup.
	pub async fn init(&self) -> Result<(), StoreError> {
		self.backend.init().await
	}

	/// Returns all order rows.
	pub async fn list_orders(&self) -> Result<Vec<Order>, StoreError> {
		self.backend.list_orders().await
	}

	/// Fetches a single order by primary key.
	pub async fn order_by_id(&self, id: OrderId) -> Result<Order, StoreError> {
		self.backend.order_by_id(id).await
	}

	/// Sets the status of an order and returns the updated row.
	pub async fn update_status(&self, id: OrderId, status: &str) -> Result<Order, StoreError> {
		let updated = self.backend.update_status(id, status).await?;
		tracing::debug!(order_id = id, status = %status, "Updated order status");
		Ok(updated)
	}

	/// Inserts a new order and returns the stored row.
	pub async fn insert_order(&self, order: NewOrder) -> Result<Order, StoreError> {
		self.backend.insert_order(order).await
	}
}
