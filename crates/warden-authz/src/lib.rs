// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Hybrid role-based and attribute-based authorization for Warden.
//!
//! The engine answers one question: may this subject perform this action on this
//! resource? It is a default-deny allow-list evaluated over an immutable snapshot:
//!
//! - [`RoleTable`]: which roles each user holds
//! - [`RuleSet`]: grant rules, each a principal, a [`ResourcePattern`], an action and
//!   an optional [`Condition`] on the resource's owner or approver
//! - [`Enforcer`]: the pair of the two, answering [`Enforcer::enforce`]
//! - [`PolicyStore`]: a shared handle that swaps snapshots atomically on reload
//!
//! # Example
//!
//! ```
//! use warden_authz::{load_enforcer, Action, PolicyRow, PolicyRows, Resource, RoleRow, Subject};
//!
//! let rows = PolicyRows {
//!     rules: vec![
//!         PolicyRow::new("role:user", "resource:order", "action:write"),
//!         PolicyRow::new("role:user", "resource:order:*", "action:read").with_condition("owner"),
//!     ],
//!     roles: vec![RoleRow::new("user:alice", "role:user")],
//! };
//! let enforcer = load_enforcer(&rows).unwrap();
//!
//! let alice = Subject::user("alice").unwrap();
//! let order = Resource::instance("order", "ord_a1")
//!     .and_then(|r| r.with_owner("user:alice"))
//!     .unwrap();
//!
//! assert!(enforcer.enforce(&alice, &order, &Action::new("read").unwrap()));
//! ```

pub mod audit;
pub mod condition;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod policy;
pub mod roles;
pub mod source;
pub mod store;
pub mod types;

pub use audit::{AuditEntry, AuditEventType};
pub use engine::{Decision, Enforcer, MatchedRule};
pub use error::{PolicyFormatError, ValidationError};
pub use policy::{Condition, ResourcePattern, Rule, RuleSet};
pub use roles::{RoleTable, RoleTableBuilder};
pub use source::{
	load_enforcer, load_policy, load_role_assignments, parse_lines, PolicyRow, PolicyRows,
	PolicySource, RoleRow, StaticPolicySource,
};
pub use store::PolicyStore;
pub use types::{Action, Resource, Subject, SubjectKind, Urn};
