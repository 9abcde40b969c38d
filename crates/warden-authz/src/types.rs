// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Identity model for authorization requests.
//!
//! This module defines the values a caller hands to the engine:
//!
//! - [`Subject`]: the user (or role) making the request
//! - [`Resource`]: a resource type, or a specific instance of it carrying owner and
//!   approver attributes
//! - [`Action`]: the operation being attempted
//!
//! Every value has a canonical [`Urn`]. URNs are derived from immutable fields, so two
//! values with equal fields always produce equal URNs.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, ValidationError};

pub const USER_KIND: &str = "user";
pub const ROLE_KIND: &str = "role";
pub const RESOURCE_KIND: &str = "resource";
pub const ACTION_KIND: &str = "action";

// =============================================================================
// Urn
// =============================================================================

/// Canonical identifier of the form `<kind>:<identity>[:<subidentity>]`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Urn(String);

impl Urn {
	/// Parses a URN, requiring a non-empty kind and a non-empty remainder.
	pub fn parse(value: impl Into<String>) -> Result<Self> {
		let value = value.into();
		match value.split_once(':') {
			Some((kind, rest)) if !kind.is_empty() && !rest.is_empty() => Ok(Self(value)),
			_ => Err(ValidationError::MalformedUrn(value)),
		}
	}

	fn from_parts(kind: &str, identity: &str) -> Self {
		Self(format!("{kind}:{identity}"))
	}

	/// Returns the kind segment (`user`, `role`, `resource`, `action`, ...).
	pub fn kind(&self) -> &str {
		self.0.split_once(':').map(|(kind, _)| kind).unwrap_or("")
	}

	/// Returns everything after the kind segment.
	pub fn body(&self) -> &str {
		self.0.split_once(':').map(|(_, body)| body).unwrap_or("")
	}

	pub fn is_user(&self) -> bool {
		self.kind() == USER_KIND
	}

	pub fn is_role(&self) -> bool {
		self.kind() == ROLE_KIND
	}

	/// Parses a URN and checks that it has the expected kind.
	pub fn parse_kind(value: impl Into<String>, expected: &'static str) -> Result<Self> {
		let urn = Self::parse(value)?;
		if urn.kind() != expected {
			return Err(ValidationError::WrongKind {
				urn: urn.0,
				expected,
			});
		}
		Ok(urn)
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for Urn {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl AsRef<str> for Urn {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

impl TryFrom<String> for Urn {
	type Error = ValidationError;

	fn try_from(value: String) -> Result<Self> {
		Self::parse(value)
	}
}

impl From<Urn> for String {
	fn from(urn: Urn) -> Self {
		urn.0
	}
}

impl PartialEq<str> for Urn {
	fn eq(&self, other: &str) -> bool {
		self.0 == other
	}
}

impl PartialEq<&str> for Urn {
	fn eq(&self, other: &&str) -> bool {
		self.0 == *other
	}
}

fn non_empty(value: String, field: &'static str) -> Result<String> {
	if value.is_empty() {
		return Err(ValidationError::Empty { field });
	}
	Ok(value)
}

// =============================================================================
// Subject
// =============================================================================

/// Whether a subject is a user or a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectKind {
	User,
	Role,
}

/// The party requesting access.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Subject {
	kind: SubjectKind,
	identity: String,
}

impl Subject {
	/// Creates a user subject.
	pub fn user(identity: impl Into<String>) -> Result<Self> {
		Ok(Self {
			kind: SubjectKind::User,
			identity: non_empty(identity.into(), "user identity")?,
		})
	}

	/// Creates a role subject.
	pub fn role(identity: impl Into<String>) -> Result<Self> {
		Ok(Self {
			kind: SubjectKind::Role,
			identity: non_empty(identity.into(), "role identity")?,
		})
	}

	pub fn kind(&self) -> SubjectKind {
		self.kind
	}

	pub fn identity(&self) -> &str {
		&self.identity
	}

	pub fn urn(&self) -> Urn {
		match self.kind {
			SubjectKind::User => Urn::from_parts(USER_KIND, &self.identity),
			SubjectKind::Role => Urn::from_parts(ROLE_KIND, &self.identity),
		}
	}
}

impl fmt::Display for Subject {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.urn())
	}
}

// =============================================================================
// Resource
// =============================================================================

/// A resource type, or a specific instance of one.
///
/// Without an identity the value names the type itself and is used as a policy anchor.
/// Owner and approver are assigned once by whatever created the instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Resource {
	resource_type: String,
	identity: Option<String>,
	owner_urn: Option<Urn>,
	approver_urn: Option<Urn>,
}

impl Resource {
	/// Creates the bare resource type.
	pub fn new(resource_type: impl Into<String>) -> Result<Self> {
		let resource_type = non_empty(resource_type.into(), "resource type")?;
		if resource_type.contains(':') {
			return Err(ValidationError::InvalidResourceType(resource_type));
		}
		Ok(Self {
			resource_type,
			identity: None,
			owner_urn: None,
			approver_urn: None,
		})
	}

	/// Creates a specific instance of a resource type.
	pub fn instance(resource_type: impl Into<String>, identity: impl Into<String>) -> Result<Self> {
		Self::new(resource_type)?.with_identity(identity)
	}

	/// Builder: set the instance identity.
	pub fn with_identity(mut self, identity: impl Into<String>) -> Result<Self> {
		self.identity = Some(non_empty(identity.into(), "resource identity")?);
		Ok(self)
	}

	/// Builder: set the owner URN.
	pub fn with_owner(mut self, owner: impl Into<String>) -> Result<Self> {
		self.owner_urn = Some(Urn::parse(non_empty(owner.into(), "owner urn")?)?);
		Ok(self)
	}

	/// Builder: set the approver URN.
	pub fn with_approver(mut self, approver: impl Into<String>) -> Result<Self> {
		self.approver_urn = Some(Urn::parse(non_empty(approver.into(), "approver urn")?)?);
		Ok(self)
	}

	pub fn resource_type(&self) -> &str {
		&self.resource_type
	}

	pub fn identity(&self) -> Option<&str> {
		self.identity.as_deref()
	}

	pub fn owner_urn(&self) -> Option<&Urn> {
		self.owner_urn.as_ref()
	}

	pub fn approver_urn(&self) -> Option<&Urn> {
		self.approver_urn.as_ref()
	}

	/// Returns true if this value names the type rather than an instance.
	pub fn is_type(&self) -> bool {
		self.identity.is_none()
	}

	pub fn urn(&self) -> Urn {
		match &self.identity {
			Some(identity) => Urn(format!(
				"{RESOURCE_KIND}:{}:{identity}",
				self.resource_type
			)),
			None => Urn::from_parts(RESOURCE_KIND, &self.resource_type),
		}
	}
}

impl fmt::Display for Resource {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.urn())
	}
}

// =============================================================================
// Action
// =============================================================================

/// An operation on a resource. Names are opaque domain verbs (`read`, `approve`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Action(String);

impl Action {
	pub fn new(name: impl Into<String>) -> Result<Self> {
		Ok(Self(non_empty(name.into(), "action name")?))
	}

	pub fn name(&self) -> &str {
		&self.0
	}

	pub fn urn(&self) -> Urn {
		Urn::from_parts(ACTION_KIND, &self.0)
	}
}

impl fmt::Display for Action {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.urn())
	}
}
