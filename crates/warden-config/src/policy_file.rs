// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Policy files on disk.
//!
//! Two layouts are accepted. TOML:
//!
//! ```toml
//! [[rules]]
//! principal = "role:user"
//! resource = "resource:order:*"
//! action = "action:read"
//! condition = "owner"
//!
//! [[roles]]
//! member = "user:alice"
//! role = "role:user"
//! ```
//!
//! and the line format read by [`warden_authz::parse_lines`].

use std::path::{Path, PathBuf};

use tracing::debug;
use warden_authz::{parse_lines, PolicyFormatError, PolicyRows, PolicySource, PolicyStore};

use crate::error::ConfigError;
use crate::sections::{PolicyConfig, PolicyFormat};

/// Reads policy rows from a file every time it is loaded.
#[derive(Debug, Clone)]
pub struct FilePolicySource {
	name: String,
	path: PathBuf,
	format: PolicyFormat,
}

impl FilePolicySource {
	pub fn new(path: impl Into<PathBuf>, format: PolicyFormat) -> Self {
		let path = path.into();
		Self {
			name: path.display().to_string(),
			path,
			format,
		}
	}

	pub fn from_config(config: &PolicyConfig) -> Self {
		Self::new(config.path.clone(), config.format)
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	pub fn format(&self) -> PolicyFormat {
		self.format
	}

	fn source_error(&self, message: String) -> PolicyFormatError {
		PolicyFormatError::Source {
			name: self.name.clone(),
			message,
		}
	}
}

impl PolicySource for FilePolicySource {
	fn name(&self) -> &str {
		&self.name
	}

	fn load(&self) -> Result<PolicyRows, PolicyFormatError> {
		debug!(path = %self.path.display(), format = %self.format, "reading policy file");
		let content = std::fs::read_to_string(&self.path)
			.map_err(|e| self.source_error(format!("failed to read: {e}")))?;

		match self.format {
			PolicyFormat::Toml => toml::from_str::<PolicyRows>(&content)
				.map_err(|e| self.source_error(format!("failed to parse: {e}"))),
			PolicyFormat::Lines => parse_lines(&content),
		}
	}
}

/// Loads the configured policy file into a new store.
///
/// Fails if the file is missing or any row is invalid.
pub fn open_store(config: &PolicyConfig) -> Result<PolicyStore, ConfigError> {
	let source = FilePolicySource::from_config(config);
	Ok(PolicyStore::from_source(&source)?)
}
