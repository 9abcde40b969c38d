// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Grant rules and the rule set they are loaded into.
//!
//! A [`Rule`] binds a principal, a [`ResourcePattern`], an action and an optional
//! [`Condition`]. Rules only ever grant; a request that no rule grants is denied.
//!
//! The breadth of a grant is declared by the pattern kind chosen when the rule is
//! written. A role that manages every instance of a type gets both a
//! [`ResourcePattern::TypeOnly`] and a [`ResourcePattern::WildcardInstance`] rule; a
//! role scoped to one instance gets a single [`ResourcePattern::Exact`] rule.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::condition;
use crate::error::{PolicyFormatError, ValidationError};
use crate::matcher;
use crate::types::{Resource, Urn, ACTION_KIND, RESOURCE_KIND};

/// Identity segment that marks a wildcard-instance pattern in textual form.
pub const WILDCARD_IDENTITY: &str = "*";

/// Prefix that forces a textual pattern to be read as an exact URN.
pub const EXACT_PREFIX: char = '=';

/// Which resource URNs a rule covers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ResourcePattern {
	/// Only this literal URN (a bare type or one specific instance).
	Exact(Urn),
	/// Only the bare type URN, never an instance.
	TypeOnly(String),
	/// Any instance of the type, never the bare type.
	WildcardInstance(String),
}

impl ResourcePattern {
	/// Parses the textual form used by policy rows.
	///
	/// - `resource:<type>` is [`ResourcePattern::TypeOnly`]
	/// - `resource:<type>:*` is [`ResourcePattern::WildcardInstance`]
	/// - `resource:<type>:<identity>` is [`ResourcePattern::Exact`]
	/// - `=<urn>` is [`ResourcePattern::Exact`] for that literal URN
	pub fn parse(text: &str) -> Result<Self, PolicyFormatError> {
		let invalid = || PolicyFormatError::InvalidPattern(text.to_string());

		if let Some(literal) = text.strip_prefix(EXACT_PREFIX) {
			let urn = Urn::parse_kind(literal, RESOURCE_KIND).map_err(|_| invalid())?;
			return Ok(Self::Exact(urn));
		}

		let urn = Urn::parse_kind(text, RESOURCE_KIND).map_err(|_| invalid())?;
		let parsed = matcher::ResourceUrn::parse(&urn).ok_or_else(invalid)?;
		match parsed.identity {
			None => Ok(Self::TypeOnly(parsed.resource_type.to_string())),
			Some("") => Err(invalid()),
			Some(WILDCARD_IDENTITY) => Ok(Self::WildcardInstance(parsed.resource_type.to_string())),
			Some(_) => Ok(Self::Exact(urn)),
		}
	}

	/// Covers the bare type and every instance of it.
	///
	/// Returns the two patterns a broad grant is made of.
	pub fn whole_type(resource_type: &str) -> [Self; 2] {
		[
			Self::TypeOnly(resource_type.to_string()),
			Self::WildcardInstance(resource_type.to_string()),
		]
	}

	pub fn matches(&self, resource: &Urn) -> bool {
		matcher::matches(self, resource)
	}
}

impl fmt::Display for ResourcePattern {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Exact(urn) => {
				// Exact bare types would otherwise read back as TypeOnly.
				let ambiguous = matcher::ResourceUrn::parse(urn)
					.map(|parsed| matches!(parsed.identity, None | Some(WILDCARD_IDENTITY)))
					.unwrap_or(true);
				if ambiguous {
					write!(f, "{EXACT_PREFIX}{urn}")
				} else {
					write!(f, "{urn}")
				}
			}
			Self::TypeOnly(resource_type) => write!(f, "{RESOURCE_KIND}:{resource_type}"),
			Self::WildcardInstance(resource_type) => {
				write!(f, "{RESOURCE_KIND}:{resource_type}:{WILDCARD_IDENTITY}")
			}
		}
	}
}

impl FromStr for ResourcePattern {
	type Err = PolicyFormatError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}

/// Attribute predicate gating a rule beyond principal, resource and action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
	#[default]
	None,
	/// The subject must be the resource's owner.
	OwnerMatch,
	/// The subject must be the resource's assigned approver.
	ApproverMatch,
}

impl Condition {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::None => "none",
			Self::OwnerMatch => "owner",
			Self::ApproverMatch => "approver",
		}
	}
}

impl fmt::Display for Condition {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Condition {
	type Err = PolicyFormatError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim() {
			"" | "none" => Ok(Self::None),
			"owner" => Ok(Self::OwnerMatch),
			"approver" => Ok(Self::ApproverMatch),
			other => Err(PolicyFormatError::UnknownCondition(other.to_string())),
		}
	}
}

/// A single grant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Rule {
	principal: Urn,
	resource: ResourcePattern,
	action: Urn,
	condition: Condition,
}

impl Rule {
	/// Creates an unconditional rule. The principal must be a user or role URN and
	/// the action an action URN.
	pub fn new(principal: Urn, resource: ResourcePattern, action: Urn) -> Result<Self, ValidationError> {
		if !principal.is_user() && !principal.is_role() {
			return Err(ValidationError::WrongKind {
				urn: principal.into(),
				expected: "user or role",
			});
		}
		if action.kind() != ACTION_KIND {
			return Err(ValidationError::WrongKind {
				urn: action.into(),
				expected: ACTION_KIND,
			});
		}
		Ok(Self {
			principal,
			resource,
			action,
			condition: Condition::None,
		})
	}

	/// Builder: set the condition.
	pub fn with_condition(mut self, condition: Condition) -> Self {
		self.condition = condition;
		self
	}

	pub fn principal(&self) -> &Urn {
		&self.principal
	}

	pub fn resource(&self) -> &ResourcePattern {
		&self.resource
	}

	pub fn action(&self) -> &Urn {
		&self.action
	}

	pub fn condition(&self) -> Condition {
		self.condition
	}

	/// Returns true if this rule grants the request.
	///
	/// `principals` is the subject's effective principal set; the condition is checked
	/// against the subject's own URN.
	pub fn allows(&self, principals: &BTreeSet<Urn>, subject: &Urn, resource: &Resource) -> bool {
		principals.contains(&self.principal)
			&& self.resource.matches(&resource.urn())
			&& condition::evaluate(self.condition, subject, resource)
	}
}

impl fmt::Display for Rule {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{}, {}, {}, {}",
			self.principal, self.resource, self.action, self.condition
		)
	}
}

/// Immutable rule collection indexed by action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
	rules: Vec<Rule>,
	by_action: HashMap<Urn, Vec<usize>>,
}

impl RuleSet {
	pub fn new(rules: Vec<Rule>) -> Self {
		let mut by_action: HashMap<Urn, Vec<usize>> = HashMap::new();
		for (index, rule) in rules.iter().enumerate() {
			by_action.entry(rule.action.clone()).or_default().push(index);
		}
		Self { rules, by_action }
	}

	/// Every rule for `action`, in load order.
	pub fn rules_for_action<'a>(&'a self, action: &Urn) -> impl Iterator<Item = &'a Rule> + 'a {
		self.candidates(action).map(|(_, rule)| rule)
	}

	/// Like [`RuleSet::rules_for_action`] but paired with each rule's load index.
	pub fn candidates<'a>(&'a self, action: &Urn) -> impl Iterator<Item = (usize, &'a Rule)> + 'a {
		self
			.by_action
			.get(action)
			.into_iter()
			.flatten()
			.map(move |&index| (index, &self.rules[index]))
	}

	pub fn rules(&self) -> &[Rule] {
		&self.rules
	}

	pub fn len(&self) -> usize {
		self.rules.len()
	}

	pub fn is_empty(&self) -> bool {
		self.rules.is_empty()
	}
}
