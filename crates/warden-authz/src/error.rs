// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for identity construction and policy loading.
//!
//! A denied request is never an error: [`crate::Enforcer::enforce`] returns
//! `false`. Errors only arise when a value or a policy record is malformed.

use thiserror::Error;

/// Errors raised while constructing identity values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
	#[error("{field} must not be empty")]
	Empty { field: &'static str },

	#[error("resource type '{0}' must not contain ':'")]
	InvalidResourceType(String),

	#[error("malformed urn '{0}'")]
	MalformedUrn(String),

	#[error("urn '{urn}' is not a {expected} urn")]
	WrongKind { urn: String, expected: &'static str },
}

/// Errors raised while loading rules or role assignments.
///
/// A load that fails with this error publishes nothing.
#[derive(Debug, Error)]
pub enum PolicyFormatError {
	#[error("rule {index}: {message}")]
	InvalidRule { index: usize, message: String },

	#[error("role assignment {index}: {message}")]
	InvalidAssignment { index: usize, message: String },

	#[error("line {line}: {message}")]
	InvalidLine { line: usize, message: String },

	#[error("unknown condition '{0}'")]
	UnknownCondition(String),

	#[error("invalid resource pattern '{0}'")]
	InvalidPattern(String),

	#[error("policy source '{name}' failed: {message}")]
	Source { name: String, message: String },

	#[error(transparent)]
	Validation(#[from] ValidationError),
}

/// Result type for identity construction.
pub type Result<T> = std::result::Result<T, ValidationError>;
