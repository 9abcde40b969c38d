// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Static role assignments.
//!
//! A [`RoleTable`] maps user URNs to the role URNs they hold. Roles do not inherit
//! from one another unless the table carries an explicit implication row
//! (`role:manager` implies `role:user_manager`); the closure over those rows is
//! computed once when the table is built, so lookups stay a single map access.

use std::collections::{BTreeSet, HashMap};

use crate::types::Urn;

static NO_ROLES: BTreeSet<Urn> = BTreeSet::new();

/// Immutable mapping from principal URN to the roles it holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleTable {
	assignments: HashMap<Urn, BTreeSet<Urn>>,
	implications: HashMap<Urn, BTreeSet<Urn>>,
	resolved: HashMap<Urn, BTreeSet<Urn>>,
}

impl RoleTable {
	pub fn builder() -> RoleTableBuilder {
		RoleTableBuilder::default()
	}

	/// Returns the roles held by `principal`, including roles reached through
	/// implication rows. Unknown principals hold no roles.
	pub fn roles_of(&self, principal: &Urn) -> &BTreeSet<Urn> {
		self.resolved.get(principal).unwrap_or(&NO_ROLES)
	}

	pub fn holds(&self, principal: &Urn, role: &Urn) -> bool {
		self.roles_of(principal).contains(role)
	}

	/// The principal itself plus every role it holds.
	pub fn effective_principals(&self, principal: &Urn) -> BTreeSet<Urn> {
		let mut principals = self.roles_of(principal).clone();
		principals.insert(principal.clone());
		principals
	}

	/// Roles directly assigned to `user`, without implication.
	pub fn direct_roles(&self, user: &Urn) -> impl Iterator<Item = &Urn> {
		self.assignments.get(user).into_iter().flatten()
	}

	/// Number of direct assignment pairs.
	pub fn assignment_count(&self) -> usize {
		self.assignments.values().map(BTreeSet::len).sum()
	}

	/// Number of implication pairs.
	pub fn implication_count(&self) -> usize {
		self.implications.values().map(BTreeSet::len).sum()
	}

	pub fn is_empty(&self) -> bool {
		self.assignments.is_empty() && self.implications.is_empty()
	}
}

/// Collects assignment and implication pairs, then resolves them into a [`RoleTable`].
#[derive(Debug, Default)]
pub struct RoleTableBuilder {
	assignments: HashMap<Urn, BTreeSet<Urn>>,
	implications: HashMap<Urn, BTreeSet<Urn>>,
}

impl RoleTableBuilder {
	/// Records that `user` holds `role`.
	pub fn assign(mut self, user: Urn, role: Urn) -> Self {
		self.assignments.entry(user).or_default().insert(role);
		self
	}

	/// Records that holding `broad` also grants `narrow`.
	pub fn imply(mut self, broad: Urn, narrow: Urn) -> Self {
		self.implications.entry(broad).or_default().insert(narrow);
		self
	}

	pub fn build(self) -> RoleTable {
		let mut resolved = HashMap::new();

		let principals = self.assignments.keys().chain(self.implications.keys());
		for principal in principals {
			if resolved.contains_key(principal) {
				continue;
			}
			let mut held = BTreeSet::new();
			let mut pending: Vec<&Urn> = self
				.assignments
				.get(principal)
				.into_iter()
				.chain(self.implications.get(principal))
				.flatten()
				.collect();
			while let Some(role) = pending.pop() {
				if role == principal || !held.insert(role.clone()) {
					continue;
				}
				if let Some(implied) = self.implications.get(role) {
					pending.extend(implied);
				}
			}
			resolved.insert(principal.clone(), held);
		}

		RoleTable {
			assignments: self.assignments,
			implications: self.implications,
			resolved,
		}
	}
}
