// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Layered configuration for warden.
//!
//! Values come from built-in defaults, then a TOML file, then `WARDEN_*`
//! environment variables; later sources override earlier ones field by field.
//!
//! # Usage
//!
//! ```ignore
//! use warden_config::load_config;
//!
//! let config = load_config()?;
//! println!("database at {}", config.database.url);
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::WardenConfigLayer;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use tracing::{debug, info};

/// Fully resolved configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WardenConfig {
	pub database: DatabaseConfig,
	pub logging: LoggingConfig,
	pub authz: AuthzConfig,
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`WARDEN_*`)
/// 2. Config file (`/etc/warden/warden.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<WardenConfig, ConfigError> {
	load_from(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration with a custom config file path in place of the system one.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<WardenConfig, ConfigError> {
	load_from(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

fn load_from(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<WardenConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = WardenConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		merged.merge(source.load()?);
	}

	finalize(merged)
}

/// Resolve a merged layer into a validated configuration.
pub fn finalize(layer: WardenConfigLayer) -> Result<WardenConfig, ConfigError> {
	let database = layer.database.unwrap_or_default().finalize();
	let logging = layer.logging.unwrap_or_default().finalize();
	let authz = layer.authz.unwrap_or_default().finalize();

	validate_config(&database, &logging)?;

	info!(
		database = %database.url,
		max_connections = database.max_connections,
		log_level = %logging.level,
		log_format = %logging.format,
		log_grants = authz.log_grants,
		log_denials = authz.log_denials,
		metrics_enabled = authz.metrics_enabled,
		"warden configuration loaded"
	);

	Ok(WardenConfig {
		database,
		logging,
		authz,
	})
}

fn validate_config(database: &DatabaseConfig, logging: &LoggingConfig) -> Result<(), ConfigError> {
	if database.url.trim().is_empty() {
		return Err(ConfigError::Validation(
			"database.url must not be empty".to_string(),
		));
	}
	if database.max_connections == 0 {
		return Err(ConfigError::Validation(
			"database.max_connections must be at least 1".to_string(),
		));
	}
	if logging.level.trim().is_empty() {
		return Err(ConfigError::Validation(
			"logging.level must not be empty".to_string(),
		));
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	fn layer_from(toml: &str) -> WardenConfigLayer {
		toml::from_str(toml).unwrap()
	}

	#[test]
	fn empty_layer_finalizes_to_defaults() {
		let config = finalize(WardenConfigLayer::default()).unwrap();
		assert_eq!(config, WardenConfig::default());
	}

	#[test]
	fn file_values_override_defaults() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("warden.toml");
		std::fs::write(
			&path,
			r#"
			[database]
			url = "sqlite:/srv/warden/authz.db"

			[logging]
			level = "warden_authz=debug,info"
			format = "json"

			[authz]
			log_grants = true
			"#,
		)
		.unwrap();

		let layer = TomlSource::new(&path).load().unwrap();
		let config = finalize(layer).unwrap();
		assert_eq!(config.database.url, "sqlite:/srv/warden/authz.db");
		assert_eq!(config.database.max_connections, 5);
		assert_eq!(config.logging.format, LogFormat::Json);
		assert_eq!(config.logging.level, "warden_authz=debug,info");
		assert!(config.authz.log_grants);
		assert!(config.authz.log_denials);
	}

	#[test]
	fn zero_connections_is_rejected() {
		let layer = layer_from("[database]\nmax_connections = 0\n");
		let err = finalize(layer).unwrap_err();
		assert!(matches!(err, ConfigError::Validation(_)));
	}

	#[test]
	fn unknown_log_format_is_a_parse_error() {
		let parsed: Result<WardenConfigLayer, _> = toml::from_str("[logging]\nformat = \"xml\"\n");
		assert!(parsed.is_err());
	}

	proptest! {
		#[test]
		fn higher_layer_wins_when_set(
			low in proptest::option::of(1u32..64),
			high in proptest::option::of(1u32..64),
		) {
			let mut merged = WardenConfigLayer {
				database: Some(DatabaseConfigLayer { url: None, max_connections: low }),
				..Default::default()
			};
			merged.merge(WardenConfigLayer {
				database: Some(DatabaseConfigLayer { url: None, max_connections: high }),
				..Default::default()
			});
			let config = finalize(merged).unwrap();
			let expected = high.or(low).unwrap_or(5);
			prop_assert_eq!(config.database.max_connections, expected);
		}
	}
}
