//! Registry trait for self-registering implementations.
//!
//! This module provides the base trait that storage backends and notify
//! providers implement to register themselves with their configuration name
//! and factory function.

/// Base trait for implementation registries.
///
/// Each implementation module (store backend, notify provider) provides a
/// Registry struct implementing this trait, declaring its configuration
/// name and factory function.
pub trait ImplementationRegistry {
	/// The name used in configuration files to reference this implementation.
	///
	/// This should match the key used in the TOML configuration, for example:
	/// - "sqlite" for storage.implementations.sqlite
	/// - "messagebird" for notifier.implementations.messagebird
	const NAME: &'static str;

	/// The factory function type this implementation provides.
	///
	/// Each seam defines its own factory type, for example StoreFactory for
	/// storage backends and NotifyFactory for notify providers.
	type Factory;

	/// Get the factory function for this implementation.
	fn factory() -> Self::Factory;
}
