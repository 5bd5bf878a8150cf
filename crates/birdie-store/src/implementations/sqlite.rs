//! SQLite storage backend implementation for the order service.
//!
//! This module provides the durable implementation of the StoreInterface
//! trait, backed by a single `orders` table accessed through parameterized
//! statements. The backend owns schema creation and can seed demo orders
//! into an empty database.

use crate::{StoreError, StoreFactory, StoreInterface, StoreRegistry};
use async_trait::async_trait;
use birdie_types::{
	ConfigSchema, Field, FieldType, ImplementationRegistry, NewOrder, Order, OrderId, Schema,
	ValidationError,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};

/// Demo orders inserted when `seed_demo_orders` is set and the table is
/// empty: (name, phone, items).
const DEMO_ORDERS: &[(&str, &str, &str)] = &[
	(
		"Hannah Hungry",
		"+319876543210",
		"1 x Hipster Burger + Fries",
	),
	(
		"Mike Madeater",
		"+319876543211",
		"1 x Chef Special Mozzarella Pizza",
	),
];

/// SQLite storage implementation.
///
/// Connections are opened lazily from a small pool; the database file is
/// created on first use. `init` creates the schema and optionally seeds
/// demo rows.
pub struct SqliteStore {
	/// Connection pool for the orders database.
	pool: SqlitePool,
	/// Whether to insert demo orders into an empty table on init.
	seed_demo_orders: bool,
}

impl SqliteStore {
	/// Creates a new SqliteStore for the database at the given path.
	///
	/// The pool connects lazily, so this does not touch the filesystem
	/// until the first query runs.
	pub fn new(path: &str, seed_demo_orders: bool) -> Self {
		let options = SqliteConnectOptions::new()
			.filename(path)
			.create_if_missing(true);

		let pool = SqlitePoolOptions::new()
			.max_connections(5)
			.connect_lazy_with(options);

		Self {
			pool,
			seed_demo_orders,
		}
	}

	/// Fetches a row by id without the NotFound mapping.
	async fn fetch_row(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
		let row = sqlx::query("SELECT id, name, phone, items, status FROM orders WHERE id = ?")
			.bind(id)
			.fetch_optional(&self.pool)
			.await
			.map_err(backend)?;

		row.as_ref().map(row_to_order).transpose()
	}
}

/// Maps a database row to an Order.
fn row_to_order(row: &SqliteRow) -> Result<Order, StoreError> {
	Ok(Order {
		id: row.try_get("id").map_err(backend)?,
		name: row.try_get("name").map_err(backend)?,
		phone: row.try_get("phone").map_err(backend)?,
		items: row.try_get("items").map_err(backend)?,
		status: row.try_get("status").map_err(backend)?,
	})
}

/// Maps a sqlx error to a backend store error.
fn backend(err: sqlx::Error) -> StoreError {
	StoreError::Backend(err.to_string())
}

#[async_trait]
impl StoreInterface for SqliteStore {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(SqliteStoreSchema)
	}

	async fn init(&self) -> Result<(), StoreError> {
		sqlx::query(
			"CREATE TABLE IF NOT EXISTS orders (
				id INTEGER PRIMARY KEY,
				name TEXT,
				phone TEXT,
				items TEXT,
				status TEXT
			)",
		)
		.execute(&self.pool)
		.await
		.map_err(backend)?;

		if self.seed_demo_orders {
			let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
				.fetch_one(&self.pool)
				.await
				.map_err(backend)?;

			if count == 0 {
				for (name, phone, items) in DEMO_ORDERS {
					self.insert_order(NewOrder {
						name: name.to_string(),
						phone: phone.to_string(),
						items: items.to_string(),
						status: birdie_types::status::PENDING.to_string(),
					})
					.await?;
				}
				tracing::info!(rows = DEMO_ORDERS.len(), "Seeded demo orders");
			}
		}

		Ok(())
	}

	async fn list_orders(&self) -> Result<Vec<Order>, StoreError> {
		let rows = sqlx::query("SELECT id, name, phone, items, status FROM orders")
			.fetch_all(&self.pool)
			.await
			.map_err(backend)?;

		rows.iter().map(row_to_order).collect()
	}

	async fn order_by_id(&self, id: OrderId) -> Result<Order, StoreError> {
		self.fetch_row(id).await?.ok_or(StoreError::NotFound)
	}

	async fn update_status(&self, id: OrderId, status: &str) -> Result<Order, StoreError> {
		// Lookup first: a missing id must fail without a write
		self.fetch_row(id).await?.ok_or(StoreError::NotFound)?;

		sqlx::query("UPDATE orders SET status = ? WHERE id = ?")
			.bind(status)
			.bind(id)
			.execute(&self.pool)
			.await
			.map_err(backend)?;

		self.fetch_row(id).await?.ok_or(StoreError::NotFound)
	}

	async fn insert_order(&self, order: NewOrder) -> Result<Order, StoreError> {
		let result =
			sqlx::query("INSERT INTO orders (name, phone, items, status) VALUES (?, ?, ?, ?)")
				.bind(&order.name)
				.bind(&order.phone)
				.bind(&order.items)
				.bind(&order.status)
				.execute(&self.pool)
				.await
				.map_err(backend)?;

		let id = result.last_insert_rowid();
		self.fetch_row(id).await?.ok_or(StoreError::NotFound)
	}
}

/// Configuration schema for SqliteStore.
pub struct SqliteStoreSchema;

impl ConfigSchema for SqliteStoreSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			// Required fields
			vec![
				Field::new("path", FieldType::String).with_validator(|value| {
					match value.as_str() {
						Some(s) if !s.is_empty() => Ok(()),
						_ => Err("path cannot be empty".to_string()),
					}
				}),
			],
			// Optional fields
			vec![Field::new("seed_demo_orders", FieldType::Boolean)],
		);

		schema.validate(config)
	}
}

/// Registry for the SQLite storage implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "sqlite";
	type Factory = StoreFactory;

	fn factory() -> Self::Factory {
		create_store
	}
}

impl StoreRegistry for Registry {}

/// Factory function to create a SQLite storage backend from configuration.
///
/// Configuration parameters:
/// - `path`: Database file path (required)
/// - `seed_demo_orders`: Insert demo rows into an empty table (default: false)
pub fn create_store(config: &toml::Value) -> Result<Box<dyn StoreInterface>, StoreError> {
	let path = config
		.get("path")
		.and_then(|v| v.as_str())
		.ok_or_else(|| StoreError::Configuration("path is required".to_string()))?;

	let seed_demo_orders = config
		.get("seed_demo_orders")
		.and_then(|v| v.as_bool())
		.unwrap_or(false);

	Ok(Box::new(SqliteStore::new(path, seed_demo_orders)))
}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::TempDir;

	fn open_store(dir: &TempDir, seed: bool) -> SqliteStore {
		let path = dir.path().join("orders.sqlite");
		SqliteStore::new(path.to_str().unwrap(), seed)
	}

	fn sample_order() -> NewOrder {
		NewOrder {
			name: "Hannah Hungry".to_string(),
			phone: "+319876543210".to_string(),
			items: "1 x Hipster Burger + Fries".to_string(),
			status: "pending".to_string(),
		}
	}

	#[tokio::test]
	async fn test_init_creates_schema() {
		let dir = tempfile::tempdir().unwrap();
		let store = open_store(&dir, false);
		store.init().await.unwrap();

		let orders = store.list_orders().await.unwrap();
		assert!(orders.is_empty());
	}

	#[tokio::test]
	async fn test_init_seeds_empty_database_once() {
		let dir = tempfile::tempdir().unwrap();
		let store = open_store(&dir, true);
		store.init().await.unwrap();

		let orders = store.list_orders().await.unwrap();
		assert_eq!(orders.len(), 2);
		assert!(orders.iter().any(|o| o.name == "Hannah Hungry"));
		assert!(orders.iter().all(|o| o.status == "pending"));

		// A second init must not duplicate the seed rows
		store.init().await.unwrap();
		assert_eq!(store.list_orders().await.unwrap().len(), 2);
	}

	#[tokio::test]
	async fn test_insert_and_get() {
		let dir = tempfile::tempdir().unwrap();
		let store = open_store(&dir, false);
		store.init().await.unwrap();

		let inserted = store.insert_order(sample_order()).await.unwrap();
		let fetched = store.order_by_id(inserted.id).await.unwrap();
		assert_eq!(fetched, inserted);
		assert_eq!(fetched.phone, "+319876543210");
	}

	#[tokio::test]
	async fn test_update_status_then_read() {
		let dir = tempfile::tempdir().unwrap();
		let store = open_store(&dir, false);
		store.init().await.unwrap();

		let inserted = store.insert_order(sample_order()).await.unwrap();
		let updated = store.update_status(inserted.id, "confirmed").await.unwrap();
		assert_eq!(updated.status, "confirmed");

		let fetched = store.order_by_id(inserted.id).await.unwrap();
		assert_eq!(fetched.status, "confirmed");
	}

	#[tokio::test]
	async fn test_arbitrary_status_is_persisted() {
		let dir = tempfile::tempdir().unwrap();
		let store = open_store(&dir, false);
		store.init().await.unwrap();

		let inserted = store.insert_order(sample_order()).await.unwrap();
		let updated = store.update_status(inserted.id, "archived").await.unwrap();
		assert_eq!(updated.status, "archived");
	}

	#[tokio::test]
	async fn test_missing_id_yields_not_found_and_no_mutation() {
		let dir = tempfile::tempdir().unwrap();
		let store = open_store(&dir, false);
		store.init().await.unwrap();

		let inserted = store.insert_order(sample_order()).await.unwrap();

		let result = store.order_by_id(999).await;
		assert!(matches!(result, Err(StoreError::NotFound)));

		let result = store.update_status(999, "confirmed").await;
		assert!(matches!(result, Err(StoreError::NotFound)));

		let fetched = store.order_by_id(inserted.id).await.unwrap();
		assert_eq!(fetched.status, "pending");
	}

	#[tokio::test]
	async fn test_factory_requires_path() {
		let config: toml::Value = toml::Value::Table("seed_demo_orders = true".parse().unwrap());
		let result = create_store(&config);
		assert!(matches!(result, Err(StoreError::Configuration(_))));
	}

	#[test]
	fn test_config_schema() {
		let schema = SqliteStoreSchema;

		let valid: toml::Value = toml::Value::Table("path = \"orders.sqlite\"".parse().unwrap());
		assert!(schema.validate(&valid).is_ok());

		let empty_path: toml::Value = toml::Value::Table("path = \"\"".parse().unwrap());
		assert!(schema.validate(&empty_path).is_err());

		let bad_seed: toml::Value = toml::Value::Table(
			"path = \"orders.sqlite\"\nseed_demo_orders = \"yes\""
				.parse()
				.unwrap(),
		);
		assert!(schema.validate(&bad_seed).is_err());
	}
}
