// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Shared, reloadable policy snapshot.
//!
//! Readers take the current `Arc<Enforcer>` under a momentary read lock and evaluate
//! without holding it. A reload builds and validates the replacement completely
//! before taking the write lock, so readers see either the old snapshot or the new
//! one, never a partial table. A failed reload publishes nothing.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{info, warn};

use crate::audit::{AuditEntry, AuditEventType};
use crate::engine::{Decision, Enforcer};
use crate::error::PolicyFormatError;
use crate::source::{load_enforcer, PolicySource};
use crate::types::{Action, Resource, Subject};

/// Thread-safe handle to the active policy snapshot.
///
/// Cloning the store is cheap and every clone observes the same snapshot.
#[derive(Clone)]
pub struct PolicyStore {
	inner: Arc<PolicyStoreInner>,
}

struct PolicyStoreInner {
	/// Currently published snapshot.
	active: RwLock<Arc<Enforcer>>,
	/// Incremented on every successful publish.
	generation: AtomicU64,
}

impl PolicyStore {
	/// Creates a store that publishes `enforcer` as generation 1.
	pub fn new(enforcer: Enforcer) -> Self {
		Self {
			inner: Arc::new(PolicyStoreInner {
				active: RwLock::new(Arc::new(enforcer)),
				generation: AtomicU64::new(1),
			}),
		}
	}

	/// Loads the initial snapshot from `source`.
	pub fn from_source(source: &dyn PolicySource) -> Result<Self, PolicyFormatError> {
		let enforcer = load_enforcer(&source.load()?)?;
		info!(
			source = source.name(),
			rules = enforcer.rules().len(),
			"policy snapshot loaded"
		);
		Ok(Self::new(enforcer))
	}

	/// Returns the active snapshot. The snapshot stays valid after a reload.
	pub fn snapshot(&self) -> Arc<Enforcer> {
		self.inner.active.read().clone()
	}

	/// The active snapshot together with the generation it was published as.
	fn current(&self) -> (Arc<Enforcer>, u64) {
		let active = self.inner.active.read();
		(active.clone(), self.inner.generation.load(Ordering::Acquire))
	}

	pub fn generation(&self) -> u64 {
		self.inner.generation.load(Ordering::Acquire)
	}

	/// Replaces the active snapshot and returns the new generation.
	pub fn publish(&self, enforcer: Enforcer) -> u64 {
		let next = Arc::new(enforcer);
		let mut active = self.inner.active.write();
		*active = next;
		let generation = self.inner.generation.fetch_add(1, Ordering::AcqRel) + 1;
		drop(active);
		generation
	}

	/// Reloads from `source`. On error the previous snapshot stays active.
	pub fn reload(&self, source: &dyn PolicySource) -> Result<u64, PolicyFormatError> {
		let enforcer = match source.load().and_then(|rows| load_enforcer(&rows)) {
			Ok(enforcer) => enforcer,
			Err(e) => {
				warn!(
					source = source.name(),
					error = %e,
					generation = self.generation(),
					"policy reload rejected, keeping active snapshot"
				);
				AuditEntry::builder(AuditEventType::PolicyReloadRejected)
					.generation(self.generation())
					.details(serde_json::json!({ "source": source.name(), "error": e.to_string() }))
					.build()
					.emit();
				return Err(e);
			}
		};

		let rules = enforcer.rules().len();
		let generation = self.publish(enforcer);
		info!(
			source = source.name(),
			rules,
			generation,
			"policy snapshot published"
		);
		AuditEntry::builder(AuditEventType::PolicyPublished)
			.generation(generation)
			.details(serde_json::json!({ "source": source.name(), "rules": rules }))
			.build()
			.emit();
		Ok(generation)
	}

	/// Evaluates against the active snapshot and records an audit entry.
	pub fn enforce(&self, subject: &Subject, resource: &Resource, action: &Action) -> bool {
		self.decide(subject, resource, action).allowed
	}

	/// Evaluates against the active snapshot, reports the granting rule and records an
	/// audit entry tagged with the snapshot's generation.
	pub fn decide(&self, subject: &Subject, resource: &Resource, action: &Action) -> Decision {
		let (enforcer, generation) = self.current();
		let decision = enforcer.decide(subject, resource, action);
		AuditEntry::from(&decision)
			.with_generation(generation)
			.emit();
		decision
	}
}

impl Default for PolicyStore {
	fn default() -> Self {
		Self::new(Enforcer::default())
	}
}

impl std::fmt::Debug for PolicyStore {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("PolicyStore")
			.field("generation", &self.generation())
			.field("rules", &self.snapshot().rules().len())
			.finish()
	}
}
