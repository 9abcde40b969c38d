// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration for warden.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file, environment)
//! - [`FilePolicySource`] for policy files in TOML or line format
//! - Tracing subscriber setup driven by [`LoggingConfig`]
//!
//! # Usage
//!
//! ```no_run
//! use warden_config::{init_tracing, load_config, open_store};
//!
//! # fn main() -> Result<(), warden_config::ConfigError> {
//! let config = load_config()?;
//! init_tracing(&config.logging)?;
//! let store = open_store(&config.policy)?;
//! println!("policy generation {}", store.generation());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod layer;
pub mod policy_file;
pub mod sections;
pub mod sources;
pub mod telemetry;

pub use error::ConfigError;
pub use layer::WardenConfigLayer;
pub use policy_file::{open_store, FilePolicySource};
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};
pub use telemetry::init_tracing;

use tracing::{debug, info};

/// Fully resolved configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WardenConfig {
	pub policy: PolicyConfig,
	pub logging: LoggingConfig,
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`WARDEN_*`)
/// 2. Config file (`/etc/warden/warden.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<WardenConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration from environment only.
pub fn load_config_from_env() -> Result<WardenConfig, ConfigError> {
	load_from_sources(vec![Box::new(EnvSource)])
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<WardenConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

/// Merges `sources` in precedence order and finalizes the result.
pub fn load_from_sources(
	mut sources: Vec<Box<dyn ConfigSource>>,
) -> Result<WardenConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = WardenConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
fn finalize(layer: WardenConfigLayer) -> Result<WardenConfig, ConfigError> {
	let policy = layer.policy.unwrap_or_default().finalize();
	let logging = layer.logging.unwrap_or_default().finalize();

	validate_config(&policy)?;

	info!(
		policy_path = %policy.path.display(),
		policy_format = %policy.format,
		log_level = %logging.level,
		log_json = logging.json,
		"Warden configuration loaded"
	);

	Ok(WardenConfig { policy, logging })
}

/// Validate cross-field configuration rules.
fn validate_config(policy: &PolicyConfig) -> Result<(), ConfigError> {
	if policy.path.as_os_str().is_empty() {
		return Err(ConfigError::Validation(
			"policy.path must not be empty".to_string(),
		));
	}
	if policy.path.is_dir() {
		return Err(ConfigError::Validation(format!(
			"policy.path {} is a directory",
			policy.path.display()
		)));
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use std::path::PathBuf;

	use super::*;

	struct FixedSource(Precedence, WardenConfigLayer);

	impl ConfigSource for FixedSource {
		fn name(&self) -> &'static str {
			"fixed"
		}

		fn precedence(&self) -> Precedence {
			self.0
		}

		fn load(&self) -> Result<WardenConfigLayer, ConfigError> {
			Ok(self.1.clone())
		}
	}

	fn policy_layer(path: &str) -> WardenConfigLayer {
		WardenConfigLayer {
			policy: Some(PolicyConfigLayer {
				path: Some(path.into()),
				format: None,
			}),
			logging: None,
		}
	}

	#[test]
	fn test_higher_precedence_wins_regardless_of_order() {
		let config = load_from_sources(vec![
			Box::new(FixedSource(Precedence::Environment, policy_layer("/env/policy.csv"))),
			Box::new(FixedSource(Precedence::ConfigFile, policy_layer("/file/policy.toml"))),
		])
		.unwrap();
		assert_eq!(config.policy.path, PathBuf::from("/env/policy.csv"));
		assert_eq!(config.policy.format, PolicyFormat::Lines);
	}

	#[test]
	fn test_empty_sources_give_defaults() {
		let config = load_from_sources(vec![Box::new(DefaultsSource)]).unwrap();
		assert_eq!(config, WardenConfig::default());
	}

	#[test]
	fn test_directory_policy_path_rejected() {
		let dir = tempfile::tempdir().unwrap();
		let result = validate_config(&PolicyConfig {
			path: dir.path().to_path_buf(),
			format: PolicyFormat::Toml,
		});
		assert!(matches!(result, Err(ConfigError::Validation(_))));
	}

	#[test]
	fn test_empty_policy_path_rejected() {
		let result = validate_config(&PolicyConfig {
			path: PathBuf::new(),
			format: PolicyFormat::Toml,
		});
		assert!(matches!(result, Err(ConfigError::Validation(_))));
	}
}
