//! SMS message types for the notification dispatcher.
//!
//! These structs mirror the messaging provider's wire interface: a message
//! carries the originator (the sender identity shown to the recipient), one
//! or more recipient phone numbers, and the message body.

use serde::{Deserialize, Serialize};

/// An outbound SMS as submitted to the messaging provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsMessage {
	/// Sender identity shown to the recipient.
	pub originator: String,
	/// Recipient phone numbers.
	pub recipients: Vec<String>,
	/// Message body. May be empty; the dispatcher submits it regardless.
	pub body: String,
}

impl SmsMessage {
	/// Builds a message for a single recipient.
	pub fn to_recipient(originator: String, recipient: String, body: String) -> Self {
		Self {
			originator,
			recipients: vec![recipient],
			body,
		}
	}
}
