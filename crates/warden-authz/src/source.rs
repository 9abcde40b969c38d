// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Policy rows and the loaders that turn them into an [`Enforcer`].
//!
//! A [`PolicySource`] yields raw [`PolicyRows`]; where they come from (a file, a
//! database, a test fixture) is up to the implementation. Loading validates every
//! row before anything is built, so a single bad row fails the whole load.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::engine::Enforcer;
use crate::error::PolicyFormatError;
use crate::policy::{Condition, ResourcePattern, Rule, RuleSet};
use crate::roles::RoleTable;
use crate::types::{Urn, ROLE_KIND};

/// `(principal, resource-pattern, action, condition)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyRow {
	pub principal: String,
	pub resource: String,
	pub action: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub condition: Option<String>,
}

impl PolicyRow {
	pub fn new(
		principal: impl Into<String>,
		resource: impl Into<String>,
		action: impl Into<String>,
	) -> Self {
		Self {
			principal: principal.into(),
			resource: resource.into(),
			action: action.into(),
			condition: None,
		}
	}

	/// Builder: set the condition tag.
	pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
		self.condition = Some(condition.into());
		self
	}
}

/// `(member, role)`. A user member is an assignment; a role member is an
/// implication (`member` implies `role`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoleRow {
	pub member: String,
	pub role: String,
}

impl RoleRow {
	pub fn new(member: impl Into<String>, role: impl Into<String>) -> Self {
		Self {
			member: member.into(),
			role: role.into(),
		}
	}
}

/// Everything a source yields for one load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyRows {
	#[serde(default)]
	pub rules: Vec<PolicyRow>,
	#[serde(default)]
	pub roles: Vec<RoleRow>,
}

/// Something that can produce policy rows.
pub trait PolicySource: Send + Sync {
	fn name(&self) -> &str;
	fn load(&self) -> Result<PolicyRows, PolicyFormatError>;
}

/// Rows held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticPolicySource {
	name: String,
	rows: PolicyRows,
}

impl StaticPolicySource {
	pub fn new(name: impl Into<String>, rows: PolicyRows) -> Self {
		Self {
			name: name.into(),
			rows,
		}
	}
}

impl PolicySource for StaticPolicySource {
	fn name(&self) -> &str {
		&self.name
	}

	fn load(&self) -> Result<PolicyRows, PolicyFormatError> {
		Ok(self.rows.clone())
	}
}

fn required<'a>(value: &'a str, field: &str) -> Result<&'a str, String> {
	let value = value.trim();
	if value.is_empty() {
		return Err(format!("{field} must not be empty"));
	}
	Ok(value)
}

fn parse_rule(row: &PolicyRow) -> Result<Rule, String> {
	let principal = Urn::parse(required(&row.principal, "principal")?).map_err(|e| e.to_string())?;
	let resource =
		ResourcePattern::parse(required(&row.resource, "resource")?).map_err(|e| e.to_string())?;
	let action = Urn::parse(required(&row.action, "action")?).map_err(|e| e.to_string())?;
	let condition = row
		.condition
		.as_deref()
		.unwrap_or_default()
		.parse::<Condition>()
		.map_err(|e| e.to_string())?;

	Rule::new(principal, resource, action)
		.map(|rule| rule.with_condition(condition))
		.map_err(|e| e.to_string())
}

/// Builds a [`RuleSet`] from rows, preserving row order.
pub fn load_policy(rows: &[PolicyRow]) -> Result<RuleSet, PolicyFormatError> {
	let rules = rows
		.iter()
		.enumerate()
		.map(|(index, row)| {
			parse_rule(row).map_err(|message| PolicyFormatError::InvalidRule {
				index: index + 1,
				message,
			})
		})
		.collect::<Result<Vec<_>, _>>()?;

	debug!(rules = rules.len(), "loaded policy rules");
	Ok(RuleSet::new(rules))
}

/// Builds a [`RoleTable`] from rows.
pub fn load_role_assignments(rows: &[RoleRow]) -> Result<RoleTable, PolicyFormatError> {
	let mut builder = RoleTable::builder();

	for (index, row) in rows.iter().enumerate() {
		let invalid = |message: String| PolicyFormatError::InvalidAssignment {
			index: index + 1,
			message,
		};
		let member = required(&row.member, "member")
			.and_then(|member| Urn::parse(member).map_err(|e| e.to_string()))
			.map_err(invalid)?;
		let role = required(&row.role, "role")
			.and_then(|role| Urn::parse_kind(role, ROLE_KIND).map_err(|e| e.to_string()))
			.map_err(invalid)?;

		builder = if member.is_user() {
			builder.assign(member, role)
		} else if member.is_role() {
			builder.imply(member, role)
		} else {
			return Err(invalid(format!("member '{member}' must be a user or role urn")));
		};
	}

	let table = builder.build();
	debug!(
		assignments = table.assignment_count(),
		implications = table.implication_count(),
		"loaded role assignments"
	);
	Ok(table)
}

/// Validates all rows and builds an [`Enforcer`]. Nothing is returned unless every
/// row is valid.
pub fn load_enforcer(rows: &PolicyRows) -> Result<Enforcer, PolicyFormatError> {
	let rules = load_policy(&rows.rules)?;
	let roles = load_role_assignments(&rows.roles)?;
	Ok(Enforcer::new(rules, roles))
}

/// Parses the line format:
///
/// ```text
/// # comment
/// p, role:user, resource:order, action:write
/// p, role:user, resource:order:*, action:read, owner
/// g, user:alice, role:user
/// ```
///
/// Only the shape of each line is checked here; field contents are validated by the
/// loaders.
pub fn parse_lines(text: &str) -> Result<PolicyRows, PolicyFormatError> {
	let mut rows = PolicyRows::default();

	for (number, line) in text.lines().enumerate() {
		let line = line.trim();
		if line.is_empty() || line.starts_with('#') {
			continue;
		}
		let fields: Vec<&str> = line.split(',').map(str::trim).collect();
		let invalid = |message: &str| PolicyFormatError::InvalidLine {
			line: number + 1,
			message: message.to_string(),
		};

		match fields.as_slice() {
			["p", principal, resource, action] => {
				rows.rules.push(PolicyRow::new(*principal, *resource, *action));
			}
			["p", principal, resource, action, condition] => {
				rows
					.rules
					.push(PolicyRow::new(*principal, *resource, *action).with_condition(*condition));
			}
			["p", ..] => return Err(invalid("policy line needs 3 or 4 fields")),
			["g", member, role] => rows.roles.push(RoleRow::new(*member, *role)),
			["g", ..] => return Err(invalid("grouping line needs 2 fields")),
			_ => return Err(invalid("line must start with 'p' or 'g'")),
		}
	}

	Ok(rows)
}
