//! Main entry point for the Birdie order service.
//!
//! This binary wires the order store and notification dispatcher into the
//! engine and serves the staff-facing HTTP surface. Storage backends and
//! notify providers are pluggable; the configuration names which ones run.

use birdie_config::Config;
use birdie_core::{Engine, EngineBuilder, EngineFactories};
use clap::Parser;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

mod server;
mod views;

/// Command-line arguments for the order service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,
}

/// Main entry point for the order service.
///
/// This function:
/// 1. Parses command-line arguments
/// 2. Initializes logging infrastructure
/// 3. Loads configuration from file
/// 4. Builds the engine with all registered implementations
/// 5. Serves HTTP until interrupted
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};

	// Create env filter with default from args
	let default_directive = args.log_level.to_string();
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	fmt().with_env_filter(env_filter).with_target(true).init();

	tracing::info!("Started order service");

	// Load configuration
	let config_path = args
		.config
		.to_str()
		.ok_or("Configuration path is not valid UTF-8")?;
	let config = Config::from_file(config_path).await?;
	tracing::info!("Loaded configuration [{}]", config.service.id);

	let api_config = config.api.clone();

	// Build engine with implementations
	let engine = build_engine(config).await?;
	let engine = Arc::new(engine);

	server::start_server(api_config, engine).await?;

	tracing::info!("Stopped order service");
	Ok(())
}

/// Builds the engine with all registered implementations.
///
/// This function wires up the concrete implementations for:
/// - Storage backends (SQLite, in-memory)
/// - Notify providers (MessageBird, log-only)
async fn build_engine(config: Config) -> Result<Engine, Box<dyn std::error::Error>> {
	let builder = EngineBuilder::new(config);

	let mut store_factories = HashMap::new();
	for (name, factory) in birdie_store::get_all_implementations() {
		store_factories.insert(name.to_string(), factory);
	}

	let mut notify_factories = HashMap::new();
	for (name, factory) in birdie_notify::get_all_implementations() {
		notify_factories.insert(name.to_string(), factory);
	}

	let factories = EngineFactories {
		store_factories,
		notify_factories,
	};

	Ok(builder.build(factories).await?)
}

#[cfg(test)]
mod tests {
	use super::*;

	/// Creates a minimal test configuration for unit testing
	fn create_test_config() -> Config {
		r#"
[service]
id = "test-service"

[storage]
primary = "memory"
[storage.implementations.memory]

[notifier]
primary = "log"
originator = "BirdieNomNo"
[notifier.implementations.log]

[api]
host = "127.0.0.1"
port = 3000
"#
		.parse()
		.unwrap()
	}

	#[test]
	fn test_args_default_values() {
		let args = Args {
			config: PathBuf::from("config.toml"),
			log_level: "info".to_string(),
		};

		assert_eq!(args.config, PathBuf::from("config.toml"));
		assert_eq!(args.log_level, "info");
	}

	#[test]
	fn test_all_store_implementations_registered() {
		let names: Vec<&str> = birdie_store::get_all_implementations()
			.into_iter()
			.map(|(name, _)| name)
			.collect();

		assert!(names.contains(&"sqlite"));
		assert!(names.contains(&"memory"));
	}

	#[test]
	fn test_all_notify_implementations_registered() {
		let names: Vec<&str> = birdie_notify::get_all_implementations()
			.into_iter()
			.map(|(name, _)| name)
			.collect();

		assert!(names.contains(&"messagebird"));
		assert!(names.contains(&"log"));
	}

	#[tokio::test]
	async fn test_build_engine_with_minimal_config() {
		let config = create_test_config();

		let result = build_engine(config).await;

		assert!(result.is_ok(), "Failed to build engine: {:?}", result.err());

		let engine = result.unwrap();
		assert_eq!(engine.config().service.id, "test-service");
	}
}
