// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Audit trail for authorization decisions.
//!
//! The authorizer hands every completed decision, allowed or denied, to each
//! registered [`AuditSink`]. Sinks must not block: anything slow belongs behind
//! a [`QueuedAuditSink`].

mod event;
#[cfg(test)]
mod log_capture;
mod pipeline;
mod tracing_sink;

pub use event::{AuditEntry, AuditEventType};
pub use pipeline::{AuditPublishError, AuditPublisher, QueuedAuditSink};
pub use tracing_sink::TracingAuditSink;

use loom_authz_core::AuthzDecision;

use crate::context::AuthzContext;

/// Receives decisions synchronously on the request path, together with the
/// context of the request that produced them.
pub trait AuditSink: Send + Sync {
	fn record(&self, ctx: &AuthzContext, decision: &AuthzDecision);
}

/// An [`AuditSink`] backed by a closure.
pub struct FnAuditSink<F> {
	f: F,
}

impl<F> FnAuditSink<F>
where
	F: Fn(&AuthzContext, &AuthzDecision) + Send + Sync,
{
	pub fn new(f: F) -> Self {
		Self { f }
	}
}

impl<F> AuditSink for FnAuditSink<F>
where
	F: Fn(&AuthzContext, &AuthzDecision) + Send + Sync,
{
	fn record(&self, ctx: &AuthzContext, decision: &AuthzDecision) {
		(self.f)(ctx, decision)
	}
}

impl<S: AuditSink + ?Sized> AuditSink for std::sync::Arc<S> {
	fn record(&self, ctx: &AuthzContext, decision: &AuthzDecision) {
		(**self).record(ctx, decision)
	}
}
