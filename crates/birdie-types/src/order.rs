//! Order domain types for the Birdie order system.
//!
//! An order is a customer's food request record. Every field except the
//! delivery status is immutable after creation; the status is an open set
//! of strings mutated through the status-update workflow.

use serde::{Deserialize, Serialize};

/// Identifier of a persisted order row.
pub type OrderId = i64;

/// A customer's food order.
///
/// Rows are created at initialization time (seeding) and mutated only via
/// the status update; there is no delete path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
	/// Unique, immutable primary key.
	pub id: OrderId,
	/// Customer display name, immutable after creation.
	pub name: String,
	/// E.164-style phone number, used as the notification recipient.
	pub phone: String,
	/// Free-text description of the ordered items.
	pub items: String,
	/// Delivery status. Open set; any string is persisted, but only the
	/// recognized non-initial values map to a notification template.
	pub status: String,
}

/// An order before insertion; the store assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
	pub name: String,
	pub phone: String,
	pub items: String,
	pub status: String,
}

/// Recognized status values.
///
/// Status transitions are unconstrained; these constants exist so the
/// template mapping and tests agree on spelling.
pub mod status {
	/// Initial status of seeded orders. No notification.
	pub const PENDING: &str = "pending";
	/// Kitchen has accepted the order.
	pub const CONFIRMED: &str = "confirmed";
	/// Delivery is running late.
	pub const DELAYED: &str = "delayed";
	/// Driver is on the way.
	pub const DELIVERED: &str = "delivered";
}
