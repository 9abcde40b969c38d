// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Resource pattern matching.
//!
//! Matching is a three-way split and nothing is inherited between the cases:
//!
//! - `TypeOnly(settings)` matches `resource:settings` and no instance
//! - `WildcardInstance(settings)` matches `resource:settings:user`,
//!   `resource:settings:finance`, ... but not `resource:settings`
//! - `Exact(resource:settings:user)` matches that URN and nothing else

use crate::policy::ResourcePattern;
use crate::types::{Urn, RESOURCE_KIND};

/// A resource URN split into type and optional identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceUrn<'a> {
	pub resource_type: &'a str,
	pub identity: Option<&'a str>,
}

impl<'a> ResourceUrn<'a> {
	/// Splits `resource:<type>[:<identity>]`. Returns `None` for other kinds or an
	/// empty type. Everything after the type segment is the identity.
	pub fn parse(urn: &'a Urn) -> Option<Self> {
		if urn.kind() != RESOURCE_KIND {
			return None;
		}
		let (resource_type, identity) = match urn.body().split_once(':') {
			Some((resource_type, identity)) => (resource_type, Some(identity)),
			None => (urn.body(), None),
		};
		if resource_type.is_empty() {
			return None;
		}
		Some(Self {
			resource_type,
			identity,
		})
	}
}

/// Returns true if `resource` is covered by `pattern`.
pub fn matches(pattern: &ResourcePattern, resource: &Urn) -> bool {
	match pattern {
		ResourcePattern::Exact(urn) => urn == resource,
		ResourcePattern::TypeOnly(resource_type) => {
			ResourceUrn::parse(resource).is_some_and(|parsed| {
				parsed.resource_type == resource_type.as_str() && parsed.identity.is_none()
			})
		}
		ResourcePattern::WildcardInstance(resource_type) => {
			ResourceUrn::parse(resource).is_some_and(|parsed| {
				parsed.resource_type == resource_type.as_str()
					&& parsed.identity.is_some_and(|identity| !identity.is_empty())
			})
		}
	}
}
