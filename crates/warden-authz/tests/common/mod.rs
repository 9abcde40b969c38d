// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Shared fixtures: the order/settings reference policy and its cast of users.

#![allow(dead_code)]

use warden_authz::{load_enforcer, parse_lines, Action, Enforcer, Resource, Subject};

/// Orders are written by users, read and changed by their owner, and approved by
/// approvers (any approver on the bare type, only the assigned one on an instance).
/// Settings are managed wholesale by managers and per-instance by scoped managers.
pub const REFERENCE_POLICY: &str = "\
# orders
p, role:user, resource:order, action:write
p, role:user, resource:order:*, action:read, owner
p, role:user, resource:order:*, action:change, owner
p, role:approver, resource:order, action:approve
p, role:approver, resource:order:*, action:approve, approver

# settings
p, role:manager, resource:settings, action:manage
p, role:manager, resource:settings:*, action:manage
p, role:user_settings_manager, resource:settings:user, action:manage
p, role:finance_settings_manager, resource:settings:finance, action:manage

g, user:user, role:user
g, user:alice, role:user
g, user:bob, role:user
g, user:charlie, role:user
g, user:charlie, role:approver
g, user:doug, role:approver
g, user:eli, role:manager
g, user:frank, role:user_settings_manager
g, user:gary, role:finance_settings_manager
";

pub fn reference_enforcer() -> Enforcer {
	load_enforcer(&parse_lines(REFERENCE_POLICY).unwrap()).unwrap()
}

pub fn user(identity: &str) -> Subject {
	Subject::user(identity).unwrap()
}

pub fn action(name: &str) -> Action {
	Action::new(name).unwrap()
}

pub fn alice() -> Subject {
	user("alice")
}

pub fn bob() -> Subject {
	user("bob")
}

pub fn charlie() -> Subject {
	user("charlie")
}

pub fn doug() -> Subject {
	user("doug")
}

pub fn eli() -> Subject {
	user("eli")
}

pub fn frank() -> Subject {
	user("frank")
}

pub fn gary() -> Subject {
	user("gary")
}

/// Users holding `role:user`; these are the only possible order owners.
pub fn order_owners() -> Vec<Subject> {
	vec![alice(), bob(), charlie()]
}

/// Users holding `role:approver`.
pub fn approvers() -> Vec<Subject> {
	vec![charlie(), doug()]
}

pub fn everyone() -> Vec<Subject> {
	vec![alice(), bob(), charlie(), doug(), eli(), frank(), gary()]
}

pub fn order_type() -> Resource {
	Resource::new("order").unwrap()
}

pub fn settings_type() -> Resource {
	Resource::new("settings").unwrap()
}

pub fn user_settings() -> Resource {
	Resource::instance("settings", "user").unwrap()
}

pub fn finance_settings() -> Resource {
	Resource::instance("settings", "finance").unwrap()
}

/// An order instance placed by `owner` and routed to `approver`.
pub fn order(object_id: &str, owner: &Subject, approver: &Subject) -> Resource {
	Resource::instance("order", format!("ord_{object_id}"))
		.and_then(|r| r.with_owner(owner.urn().as_str()))
		.and_then(|r| r.with_approver(approver.urn().as_str()))
		.unwrap()
}
