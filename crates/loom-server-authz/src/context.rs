// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::future::Future;
use std::sync::Arc;

use loom_authz_core::Identity;
use tokio_util::sync::CancellationToken;

use crate::error::{AuthzError, Result};

/// Per-request state handed to the authorizer and on to every fetcher and describer.
///
/// Cloning is cheap; the identity is shared and the cancellation token is a handle.
#[derive(Debug, Clone, Default)]
pub struct AuthzContext {
	identity: Option<Arc<Identity>>,
	cancel: CancellationToken,
}

impl AuthzContext {
	/// A context for a caller that did not authenticate.
	pub fn anonymous() -> Self {
		Self::default()
	}

	pub fn authenticated(identity: Identity) -> Self {
		Self {
			identity: Some(Arc::new(identity)),
			cancel: CancellationToken::new(),
		}
	}

	pub fn with_identity(mut self, identity: impl Into<Arc<Identity>>) -> Self {
		self.identity = Some(identity.into());
		self
	}

	/// Ties the request to the caller's cancellation token.
	pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
		self.cancel = cancel;
		self
	}

	pub fn identity(&self) -> Option<&Identity> {
		self.identity.as_deref()
	}

	pub fn is_authenticated(&self) -> bool {
		self.identity.is_some()
	}

	pub fn cancellation(&self) -> &CancellationToken {
		&self.cancel
	}

	pub fn is_cancelled(&self) -> bool {
		self.cancel.is_cancelled()
	}

	/// Fails with [`AuthzError::Cancelled`] if the request has been cancelled.
	pub fn check(&self) -> Result<()> {
		if self.cancel.is_cancelled() {
			Err(AuthzError::Cancelled)
		} else {
			Ok(())
		}
	}

	/// Runs `fut` until it completes or the request is cancelled.
	pub(crate) async fn run<F, T>(&self, fut: F) -> Result<T>
	where
		F: Future<Output = Result<T>>,
	{
		tokio::select! {
			biased;
			_ = self.cancel.cancelled() => Err(AuthzError::Cancelled),
			result = fut => result,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn anonymous_has_no_identity() {
		let ctx = AuthzContext::anonymous();
		assert!(ctx.identity().is_none());
		assert!(!ctx.is_authenticated());
		assert!(ctx.check().is_ok());
	}

	#[test]
	fn authenticated_exposes_identity() {
		let ctx = AuthzContext::authenticated(Identity::new("sub-1", "github"));
		assert_eq!(ctx.identity().map(|i| i.subject.as_str()), Some("sub-1"));
	}

	#[test]
	fn check_reports_cancellation() {
		let token = CancellationToken::new();
		let ctx = AuthzContext::anonymous().with_cancellation(token.clone());
		token.cancel();
		assert!(matches!(ctx.check(), Err(AuthzError::Cancelled)));
	}

	#[tokio::test]
	async fn run_stops_on_cancellation() {
		let token = CancellationToken::new();
		let ctx = AuthzContext::anonymous().with_cancellation(token.clone());
		token.cancel();
		let result: Result<()> = ctx.run(std::future::pending()).await;
		assert!(matches!(result, Err(AuthzError::Cancelled)));
	}

	#[tokio::test]
	async fn run_returns_future_output() {
		let ctx = AuthzContext::anonymous();
		let result = ctx.run(async { Ok(7) }).await;
		assert_eq!(result.ok(), Some(7));
	}
}
