// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Policy file configuration section.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_POLICY_PATH: &str = "/etc/warden/policy.toml";

/// On-disk layout of a policy file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyFormat {
	/// `[[rules]]` and `[[roles]]` tables.
	Toml,
	/// `p, ...` and `g, ...` lines.
	Lines,
}

impl PolicyFormat {
	/// Guesses the format from a file extension. Anything but `.toml` is read as lines.
	pub fn from_path(path: &Path) -> Self {
		match path.extension().and_then(|ext| ext.to_str()) {
			Some(ext) if ext.eq_ignore_ascii_case("toml") => PolicyFormat::Toml,
			_ => PolicyFormat::Lines,
		}
	}
}

impl fmt::Display for PolicyFormat {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			PolicyFormat::Toml => write!(f, "toml"),
			PolicyFormat::Lines => write!(f, "lines"),
		}
	}
}

impl FromStr for PolicyFormat {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_lowercase().as_str() {
			"toml" => Ok(PolicyFormat::Toml),
			"lines" | "csv" => Ok(PolicyFormat::Lines),
			other => Err(ConfigError::InvalidValue {
				key: "policy.format".to_string(),
				message: format!("unknown policy format '{other}', expected 'toml' or 'lines'"),
			}),
		}
	}
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PolicyConfigLayer {
	pub path: Option<PathBuf>,
	pub format: Option<PolicyFormat>,
}

impl PolicyConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.path.is_some() {
			self.path = other.path;
		}
		if other.format.is_some() {
			self.format = other.format;
		}
	}

	pub fn finalize(self) -> PolicyConfig {
		let path = self
			.path
			.unwrap_or_else(|| PathBuf::from(DEFAULT_POLICY_PATH));
		let format = self.format.unwrap_or_else(|| PolicyFormat::from_path(&path));
		PolicyConfig { path, format }
	}
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PolicyConfig {
	pub path: PathBuf,
	pub format: PolicyFormat,
}

impl Default for PolicyConfig {
	fn default() -> Self {
		PolicyConfigLayer::default().finalize()
	}
}
