// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Attribute conditions.

use crate::policy::Condition;
use crate::types::{Resource, Urn};

/// Evaluates `condition` for `subject` against attributes carried on `resource`.
///
/// Only fields already on the resource value are read; a missing owner or approver
/// never matches.
pub fn evaluate(condition: Condition, subject: &Urn, resource: &Resource) -> bool {
	match condition {
		Condition::None => true,
		Condition::OwnerMatch => resource.owner_urn() == Some(subject),
		Condition::ApproverMatch => resource.approver_urn() == Some(subject),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn urn(value: &str) -> Urn {
		Urn::parse(value).unwrap()
	}

	fn order() -> Resource {
		Resource::instance("order", "ord_3f2")
			.and_then(|r| r.with_owner("user:alice"))
			.and_then(|r| r.with_approver("user:charlie"))
			.unwrap()
	}

	#[test]
	fn none_always_holds() {
		assert!(evaluate(Condition::None, &urn("user:bob"), &order()));
		assert!(evaluate(
			Condition::None,
			&urn("user:bob"),
			&Resource::new("order").unwrap()
		));
	}

	#[test]
	fn owner_match() {
		assert!(evaluate(Condition::OwnerMatch, &urn("user:alice"), &order()));
		assert!(!evaluate(Condition::OwnerMatch, &urn("user:bob"), &order()));
		assert!(!evaluate(Condition::OwnerMatch, &urn("user:charlie"), &order()));
	}

	#[test]
	fn approver_match() {
		assert!(evaluate(Condition::ApproverMatch, &urn("user:charlie"), &order()));
		assert!(!evaluate(Condition::ApproverMatch, &urn("user:doug"), &order()));
		assert!(!evaluate(Condition::ApproverMatch, &urn("user:alice"), &order()));
	}

	#[test]
	fn missing_attributes_never_match() {
		let bare = Resource::new("order").unwrap();
		assert!(!evaluate(Condition::OwnerMatch, &urn("user:alice"), &bare));
		assert!(!evaluate(Condition::ApproverMatch, &urn("user:charlie"), &bare));
	}
}
