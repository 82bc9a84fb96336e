// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use chrono::{DateTime, Utc};
use loom_authz_core::AuthzDecision;
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
	AccessGranted,
	AccessDenied,
}

impl fmt::Display for AuditEventType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			AuditEventType::AccessGranted => "access_granted",
			AuditEventType::AccessDenied => "access_denied",
		};
		write!(f, "{s}")
	}
}

/// A decision stamped for delivery to publishers.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
	pub id: Uuid,
	pub timestamp: DateTime<Utc>,
	pub event_type: AuditEventType,
	pub decision: AuthzDecision,
}

impl AuditEntry {
	pub fn from_decision(decision: AuthzDecision) -> Self {
		let event_type = if decision.is_allowed() {
			AuditEventType::AccessGranted
		} else {
			AuditEventType::AccessDenied
		};
		Self {
			id: Uuid::new_v4(),
			timestamp: Utc::now(),
			event_type,
			decision,
		}
	}
}
