// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Tracing subscriber setup.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::ConfigError;
use crate::sections::LoggingConfig;

/// Builds the filter. `RUST_LOG` wins over the configured level.
pub fn env_filter(config: &LoggingConfig) -> Result<EnvFilter, ConfigError> {
	match EnvFilter::try_from_default_env() {
		Ok(filter) => Ok(filter),
		Err(_) => EnvFilter::try_new(&config.level).map_err(|e| ConfigError::InvalidValue {
			key: "logging.level".to_string(),
			message: e.to_string(),
		}),
	}
}

/// Installs the global subscriber. Fails if one is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), ConfigError> {
	let filter = env_filter(config)?;
	let json = config.json.then(|| fmt::layer().json());
	let plain = (!config.json).then(fmt::layer);

	tracing_subscriber::registry()
		.with(filter)
		.with(json)
		.with(plain)
		.try_init()
		.map_err(|e| ConfigError::Tracing(e.to_string()))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn rejects_bad_level_directive() {
		if std::env::var_os("RUST_LOG").is_some() {
			return;
		}
		let config = LoggingConfig {
			level: "warden_authz=loud".to_string(),
			json: false,
		};
		assert!(matches!(
			env_filter(&config),
			Err(ConfigError::InvalidValue { .. })
		));
	}

	#[test]
	fn accepts_target_directives() {
		let config = LoggingConfig {
			level: "info,warden::audit=debug".to_string(),
			json: true,
		};
		assert!(env_filter(&config).is_ok());
	}

	#[test]
	fn second_init_fails() {
		let config = LoggingConfig::default();
		let _ = init_tracing(&config);
		assert!(matches!(init_tracing(&config), Err(ConfigError::Tracing(_))));
	}
}
