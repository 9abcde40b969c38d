// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Audit records for authorization decisions and policy reloads.
//!
//! Entries are emitted as structured `tracing` events on the [`AUDIT_TARGET`] target
//! so a subscriber can route them separately. They are not stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::engine::Decision;
use crate::types::Urn;

/// Tracing target for audit events.
pub const AUDIT_TARGET: &str = "warden::audit";

/// Types of events that can be recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
	/// A request was granted by a rule.
	AccessGranted,
	/// No rule granted a request.
	AccessDenied,
	/// A new policy snapshot became active.
	PolicyPublished,
	/// A reload failed and the active snapshot was kept.
	PolicyReloadRejected,
}

impl std::fmt::Display for AuditEventType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let s = match self {
			AuditEventType::AccessGranted => "access_granted",
			AuditEventType::AccessDenied => "access_denied",
			AuditEventType::PolicyPublished => "policy_published",
			AuditEventType::PolicyReloadRejected => "policy_reload_rejected",
		};
		write!(f, "{s}")
	}
}

/// A single audit record.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
	pub id: Uuid,
	pub timestamp: DateTime<Utc>,
	pub event_type: AuditEventType,
	pub subject: Option<Urn>,
	pub resource: Option<Urn>,
	pub action: Option<Urn>,
	/// Load index of the granting rule.
	pub rule_index: Option<usize>,
	/// Snapshot generation the event refers to.
	pub generation: Option<u64>,
	pub details: serde_json::Value,
}

impl AuditEntry {
	pub fn builder(event_type: AuditEventType) -> AuditEntryBuilder {
		AuditEntryBuilder::new(event_type)
	}

	/// Builder: set the snapshot generation the entry refers to.
	pub fn with_generation(mut self, generation: u64) -> Self {
		self.generation = Some(generation);
		self
	}

	/// Records the entry as a tracing event.
	pub fn emit(&self) {
		info!(
			target: AUDIT_TARGET,
			id = %self.id,
			event = %self.event_type,
			subject = self.subject.as_ref().map(Urn::as_str),
			resource = self.resource.as_ref().map(Urn::as_str),
			action = self.action.as_ref().map(Urn::as_str),
			rule_index = self.rule_index,
			generation = self.generation,
			details = %self.details,
			"audit"
		);
	}
}

impl From<&Decision> for AuditEntry {
	fn from(decision: &Decision) -> Self {
		let event_type = if decision.allowed {
			AuditEventType::AccessGranted
		} else {
			AuditEventType::AccessDenied
		};
		let mut builder = AuditEntry::builder(event_type).request(
			decision.subject.clone(),
			decision.resource.clone(),
			decision.action.clone(),
		);
		if let Some(matched) = &decision.matched {
			builder = builder.rule_index(matched.index);
		}
		builder.build()
	}
}

/// Builder for [`AuditEntry`].
#[derive(Debug, Clone)]
pub struct AuditEntryBuilder {
	event_type: AuditEventType,
	subject: Option<Urn>,
	resource: Option<Urn>,
	action: Option<Urn>,
	rule_index: Option<usize>,
	generation: Option<u64>,
	details: serde_json::Value,
}

impl AuditEntryBuilder {
	pub fn new(event_type: AuditEventType) -> Self {
		Self {
			event_type,
			subject: None,
			resource: None,
			action: None,
			rule_index: None,
			generation: None,
			details: serde_json::Value::Null,
		}
	}

	/// Set the subject, resource and action of the request.
	pub fn request(mut self, subject: Urn, resource: Urn, action: Urn) -> Self {
		self.subject = Some(subject);
		self.resource = Some(resource);
		self.action = Some(action);
		self
	}

	pub fn rule_index(mut self, index: usize) -> Self {
		self.rule_index = Some(index);
		self
	}

	pub fn generation(mut self, generation: u64) -> Self {
		self.generation = Some(generation);
		self
	}

	pub fn details(mut self, details: serde_json::Value) -> Self {
		self.details = details;
		self
	}

	pub fn build(self) -> AuditEntry {
		AuditEntry {
			id: Uuid::new_v4(),
			timestamp: Utc::now(),
			event_type: self.event_type,
			subject: self.subject,
			resource: self.resource,
			action: self.action,
			rule_index: self.rule_index,
			generation: self.generation,
			details: self.details,
		}
	}
}
