//! In-memory storage backend implementation for the order service.
//!
//! This module provides a memory-based implementation of the StoreInterface
//! trait, useful for testing and development scenarios where persistence is
//! not required.

use crate::{StoreError, StoreFactory, StoreInterface, StoreRegistry};
use async_trait::async_trait;
use birdie_types::{
	ConfigSchema, ImplementationRegistry, NewOrder, Order, OrderId, Schema, ValidationError,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory storage implementation.
///
/// Stores orders in a HashMap in memory, providing fast access but no
/// persistence across restarts. Ids are assigned monotonically the way
/// SQLite assigns rowids.
pub struct MemoryStore {
	/// The in-memory rows protected by a read-write lock.
	orders: Arc<RwLock<HashMap<OrderId, Order>>>,
}

impl MemoryStore {
	/// Creates a new MemoryStore instance.
	pub fn new() -> Self {
		Self {
			orders: Arc::new(RwLock::new(HashMap::new())),
		}
	}
}

impl Default for MemoryStore {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl StoreInterface for MemoryStore {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(MemoryStoreSchema)
	}

	async fn list_orders(&self) -> Result<Vec<Order>, StoreError> {
		let orders = self.orders.read().await;
		Ok(orders.values().cloned().collect())
	}

	async fn order_by_id(&self, id: OrderId) -> Result<Order, StoreError> {
		let orders = self.orders.read().await;
		orders.get(&id).cloned().ok_or(StoreError::NotFound)
	}

	async fn update_status(&self, id: OrderId, status: &str) -> Result<Order, StoreError> {
		let mut orders = self.orders.write().await;
		let order = orders.get_mut(&id).ok_or(StoreError::NotFound)?;
		order.status = status.to_string();
		Ok(order.clone())
	}

	async fn insert_order(&self, order: NewOrder) -> Result<Order, StoreError> {
		let mut orders = self.orders.write().await;
		let id = orders.keys().max().copied().unwrap_or(0) + 1;
		let row = Order {
			id,
			name: order.name,
			phone: order.phone,
			items: order.items,
			status: order.status,
		};
		orders.insert(id, row.clone());
		Ok(row)
	}
}

/// Configuration schema for MemoryStore.
pub struct MemoryStoreSchema;

impl ConfigSchema for MemoryStoreSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		// Memory storage has no required configuration
		let schema = Schema::new(vec![], vec![]);
		schema.validate(config)
	}
}

/// Registry for the in-memory storage implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "memory";
	type Factory = StoreFactory;

	fn factory() -> Self::Factory {
		create_store
	}
}

impl StoreRegistry for Registry {}

/// Factory function to create a memory storage backend from configuration.
///
/// Configuration parameters:
/// - None required for memory storage
pub fn create_store(_config: &toml::Value) -> Result<Box<dyn StoreInterface>, StoreError> {
	Ok(Box::new(MemoryStore::new()))
}
