// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Policy evaluation engine.
//!
//! [`Enforcer`] pairs an immutable [`RuleSet`] with an immutable [`RoleTable`] and
//! answers [`Enforcer::enforce`]. Evaluation is a pure allow-list fold:
//!
//! 1. **Principal expansion**: the subject's URN plus every role it holds
//! 2. **Candidate rules**: every rule whose action is the requested action
//! 3. **Match**: principal in the expanded set, resource pattern matches, condition holds
//! 4. **Fold**: allowed if any candidate matches, denied otherwise
//!
//! Nothing is cached between calls and nothing is mutated, so an `Enforcer` can be
//! shared across threads freely.

use serde::Serialize;
use tracing::{debug, instrument};

use crate::policy::{Rule, RuleSet};
use crate::roles::RoleTable;
use crate::types::{Action, Resource, Subject, Urn};

/// The rule that granted a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchedRule {
	/// Position of the rule in load order.
	pub index: usize,
	pub rule: Rule,
}

/// Outcome of a single request, suitable for audit logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decision {
	pub allowed: bool,
	pub subject: Urn,
	pub resource: Urn,
	pub action: Urn,
	pub matched: Option<MatchedRule>,
}

/// Immutable rule set and role table evaluated together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Enforcer {
	rules: RuleSet,
	roles: RoleTable,
}

impl Enforcer {
	pub fn new(rules: RuleSet, roles: RoleTable) -> Self {
		Self { rules, roles }
	}

	pub fn rules(&self) -> &RuleSet {
		&self.rules
	}

	pub fn roles(&self) -> &RoleTable {
		&self.roles
	}

	/// Returns true if `subject` may perform `action` on `resource`.
	///
	/// Unknown subjects, resource types and actions are not errors; they match no
	/// rule and are denied.
	pub fn enforce(&self, subject: &Subject, resource: &Resource, action: &Action) -> bool {
		self.decide(subject, resource, action).allowed
	}

	/// Evaluates a request and reports which rule, if any, granted it.
	///
	/// When several rules match, the earliest in load order is reported. The outcome
	/// does not depend on which rule is reported.
	#[instrument(
		level = "debug",
		skip(self, subject, resource, action),
		fields(
			subject = %subject,
			resource = %resource,
			action = %action,
		)
	)]
	pub fn decide(&self, subject: &Subject, resource: &Resource, action: &Action) -> Decision {
		let subject_urn = subject.urn();
		let action_urn = action.urn();
		let principals = self.roles.effective_principals(&subject_urn);

		let matched = self
			.rules
			.candidates(&action_urn)
			.find(|(_, rule)| rule.allows(&principals, &subject_urn, resource))
			.map(|(index, rule)| MatchedRule {
				index,
				rule: rule.clone(),
			});

		let allowed = matched.is_some();
		debug!(
			allowed,
			rule = matched.as_ref().map(|m| m.index),
			principals = principals.len(),
			"authorization decision"
		);

		Decision {
			allowed,
			subject: subject_urn,
			resource: resource.urn(),
			action: action_urn,
			matched,
		}
	}

	/// Every rule that grants the request, in load order.
	///
	/// Useful for auditing overlapping grants.
	pub fn matching_rules<'a>(
		&'a self,
		subject: &Subject,
		resource: &'a Resource,
		action: &Action,
	) -> impl Iterator<Item = &'a Rule> + 'a {
		let subject_urn = subject.urn();
		let principals = self.roles.effective_principals(&subject_urn);
		self
			.rules
			.rules_for_action(&action.urn())
			.filter(move |rule| rule.allows(&principals, &subject_urn, resource))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::policy::{Condition, ResourcePattern};

	fn urn(value: &str) -> Urn {
		Urn::parse(value).unwrap()
	}

	fn rule(principal: &str, resource: &str, action: &str, condition: Condition) -> Rule {
		Rule::new(
			urn(principal),
			ResourcePattern::parse(resource).unwrap(),
			urn(action),
		)
		.unwrap()
		.with_condition(condition)
	}

	fn user(identity: &str) -> Subject {
		Subject::user(identity).unwrap()
	}

	fn action(name: &str) -> Action {
		Action::new(name).unwrap()
	}

	fn order_enforcer() -> Enforcer {
		let rules = RuleSet::new(vec![
			rule("role:user", "resource:order", "action:write", Condition::None),
			rule("role:user", "resource:order:*", "action:read", Condition::OwnerMatch),
			rule("role:approver", "resource:order", "action:approve", Condition::None),
			rule(
				"role:approver",
				"resource:order:*",
				"action:approve",
				Condition::ApproverMatch,
			),
		]);
		let roles = RoleTable::builder()
			.assign(urn("user:user"), urn("role:user"))
			.assign(urn("user:charlie"), urn("role:user"))
			.assign(urn("user:charlie"), urn("role:approver"))
			.assign(urn("user:doug"), urn("role:approver"))
			.build();
		Enforcer::new(rules, roles)
	}

	mod decisions {
		use super::*;

		#[test]
		fn role_grants_write_on_bare_type() {
			let enforcer = order_enforcer();
			let order = Resource::new("order").unwrap();
			assert!(enforcer.enforce(&user("user"), &order, &action("write")));
			assert!(!enforcer.enforce(&user("doug"), &order, &action("write")));
		}

		#[test]
		fn approver_role_grants_approve_on_bare_type() {
			let enforcer = order_enforcer();
			let order = Resource::new("order").unwrap();
			assert!(enforcer.enforce(&user("charlie"), &order, &action("approve")));
			assert!(enforcer.enforce(&user("doug"), &order, &action("approve")));
			assert!(!enforcer.enforce(&user("user"), &order, &action("approve")));
		}

		#[test]
		fn approver_must_be_assigned_to_instance() {
			let enforcer = order_enforcer();
			let order = Resource::instance("order", "ord_abc")
				.and_then(|r| r.with_approver("user:charlie"))
				.unwrap();
			assert!(!enforcer.enforce(&user("doug"), &order, &action("approve")));
			assert!(enforcer.enforce(&user("charlie"), &order, &action("approve")));
		}

		#[test]
		fn unknown_action_is_denied() {
			let enforcer = order_enforcer();
			let order = Resource::new("order").unwrap();
			assert!(!enforcer.enforce(&user("charlie"), &order, &action("delete")));
		}

		#[test]
		fn unknown_subject_is_denied() {
			let enforcer = order_enforcer();
			let order = Resource::new("order").unwrap();
			assert!(!enforcer.enforce(&user("mallory"), &order, &action("write")));
		}

		#[test]
		fn empty_enforcer_denies_everything() {
			let enforcer = Enforcer::default();
			let order = Resource::new("order").unwrap();
			assert!(!enforcer.enforce(&user("charlie"), &order, &action("write")));
		}

		#[test]
		fn condition_checks_subject_not_role() {
			// A role subject is never the owner of an instance owned by a user.
			let enforcer = order_enforcer();
			let order = Resource::instance("order", "ord_1")
				.and_then(|r| r.with_owner("user:charlie"))
				.unwrap();
			let role = Subject::role("user").unwrap();
			assert!(!enforcer.enforce(&role, &order, &action("read")));
			assert!(enforcer.enforce(&user("charlie"), &order, &action("read")));
		}
	}

	mod explanation {
		use super::*;

		#[test]
		fn decision_reports_first_matching_rule() {
			let enforcer = order_enforcer();
			let order = Resource::new("order").unwrap();
			let decision = enforcer.decide(&user("charlie"), &order, &action("approve"));
			assert!(decision.allowed);
			assert_eq!(decision.subject, urn("user:charlie"));
			assert_eq!(decision.resource, urn("resource:order"));
			assert_eq!(decision.action, urn("action:approve"));
			assert_eq!(decision.matched.unwrap().index, 2);
		}

		#[test]
		fn denied_decision_has_no_rule() {
			let enforcer = order_enforcer();
			let order = Resource::new("order").unwrap();
			let decision = enforcer.decide(&user("doug"), &order, &action("write"));
			assert!(!decision.allowed);
			assert!(decision.matched.is_none());
		}

		#[test]
		fn decision_serializes_for_audit() {
			let enforcer = order_enforcer();
			let order = Resource::new("order").unwrap();
			let decision = enforcer.decide(&user("user"), &order, &action("write"));
			let json = serde_json::to_value(&decision).unwrap();
			assert_eq!(json["allowed"], true);
			assert_eq!(json["subject"], "user:user");
			assert_eq!(json["matched"]["rule"]["condition"], "none");
		}

		#[test]
		fn matching_rules_lists_every_grant() {
			let rules = RuleSet::new(vec![
				rule("role:manager", "resource:settings", "action:manage", Condition::None),
				rule("user:eli", "resource:settings", "action:manage", Condition::None),
				rule("role:manager", "resource:settings:*", "action:manage", Condition::None),
			]);
			let roles = RoleTable::builder()
				.assign(urn("user:eli"), urn("role:manager"))
				.build();
			let enforcer = Enforcer::new(rules, roles);
			let settings = Resource::new("settings").unwrap();
			let matched: Vec<_> = enforcer
				.matching_rules(&user("eli"), &settings, &action("manage"))
				.map(|rule| rule.principal().to_string())
				.collect();
			assert_eq!(matched, vec!["role:manager", "user:eli"]);
		}
	}

	#[test]
	fn repeated_calls_agree() {
		let enforcer = order_enforcer();
		let order = Resource::instance("order", "ord_9")
			.and_then(|r| r.with_owner("user:user"))
			.unwrap();
		let first = enforcer.decide(&user("user"), &order, &action("read"));
		for _ in 0..10 {
			assert_eq!(enforcer.decide(&user("user"), &order, &action("read")), first);
		}
	}
}
