// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use loom_authz_core::AuthzDecision;
use tracing::{info, warn};

use super::AuditSink;
use crate::context::AuthzContext;

/// Writes each decision as a structured `tracing` event on the
/// `loom_server_authz::audit` target. Denials are logged at `warn`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
	fn record(&self, _ctx: &AuthzContext, decision: &AuthzDecision) {
		let subject = decision
			.identity
			.as_ref()
			.map(|i| i.subject.as_str())
			.unwrap_or("");

		if decision.is_allowed() {
			info!(
				target: "loom_server_authz::audit",
				action = %decision.action,
				resource = %decision.resource_key,
				object_id = %decision.object_id,
				scope = %decision.scope,
				subject,
				roles = ?decision.roles,
				effect = %decision.effect,
				reason = %decision.reason,
				info = %decision.info,
				"access granted"
			);
		} else {
			warn!(
				target: "loom_server_authz::audit",
				action = %decision.action,
				resource = %decision.resource_key,
				object_id = %decision.object_id,
				scope = %decision.scope,
				subject,
				roles = ?decision.roles,
				effect = %decision.effect,
				reason = %decision.reason,
				info = %decision.info,
				"access denied"
			);
		}
	}
}
