// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use loom_authz_core::{
	Action, AuthzDecision, DecisionRequest, Effect, EffectResolution, ObjectId, Policy, PolicySet,
	Role, Scope,
};
use tracing::{debug, instrument, warn};

use crate::audit::AuditSink;
use crate::builder::AuthorizerBuilder;
use crate::context::AuthzContext;
use crate::error::{AuthzError, Denial, Result};
use crate::registry::Registry;
use crate::resolver::{ObjectFetcher, RoleDescriber};

/// One authorization check, as extracted by the transport from a request.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthzRequest {
	pub resource_key: String,
	pub object_id: ObjectId,
	pub scope: Scope,
	pub action: Action,
	pub default_effect: Effect,
	/// Diagnostic tag, e.g. the RPC method. Only used in messages.
	pub info: String,
}

impl AuthzRequest {
	pub fn new(resource_key: impl Into<String>, action: impl Into<Action>) -> Self {
		Self {
			resource_key: resource_key.into(),
			object_id: ObjectId::None,
			scope: Scope::GLOBAL,
			action: action.into(),
			default_effect: Effect::Deny,
			info: String::new(),
		}
	}

	pub fn with_object_id(mut self, object_id: impl Into<ObjectId>) -> Self {
		self.object_id = object_id.into();
		self
	}

	pub fn with_scope(mut self, scope: impl Into<Scope>) -> Self {
		self.scope = scope.into();
		self
	}

	pub fn with_default_effect(mut self, default_effect: Effect) -> Self {
		self.default_effect = default_effect;
		self
	}

	pub fn with_info(mut self, info: impl Into<String>) -> Self {
		self.info = info.into();
		self
	}
}

pub(crate) struct AuthorizerInner {
	pub(crate) policies: PolicySet,
	pub(crate) fetchers: Registry<Arc<dyn ObjectFetcher>>,
	pub(crate) describers: Registry<Arc<dyn RoleDescriber>>,
	pub(crate) audit_sinks: Vec<Arc<dyn AuditSink>>,
}

/// The published, read-only authorization engine.
///
/// Cloning is cheap; all clones share the same configuration.
#[derive(Clone)]
pub struct Authorizer {
	inner: Arc<AuthorizerInner>,
}

impl fmt::Debug for Authorizer {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Authorizer")
			.field("policies", &self.inner.policies.policies().len())
			.field("object_fetchers", &self.inner.fetchers.keys())
			.field("role_describers", &self.inner.describers.keys())
			.field("audit_sinks", &self.inner.audit_sinks.len())
			.finish()
	}
}

impl Authorizer {
	pub fn builder() -> AuthorizerBuilder {
		AuthorizerBuilder::new()
	}

	pub(crate) fn from_inner(inner: AuthorizerInner) -> Self {
		Self {
			inner: Arc::new(inner),
		}
	}

	pub(crate) fn policy_set(&self) -> &PolicySet {
		&self.inner.policies
	}

	pub(crate) fn object_fetcher(&self, resource_key: &str, info: &str) -> Result<&Arc<dyn ObjectFetcher>> {
		self.inner
			.fetchers
			.resolve(resource_key)
			.ok_or_else(|| AuthzError::NoObjectFetcher {
				resource_key: resource_key.to_string(),
				info: info.to_string(),
			})
	}

	pub(crate) fn role_describer(&self, resource_key: &str, info: &str) -> Result<&Arc<dyn RoleDescriber>> {
		self.inner
			.describers
			.resolve(resource_key)
			.ok_or_else(|| AuthzError::NoRoleDescriber {
				resource_key: resource_key.to_string(),
				info: info.to_string(),
			})
	}

	pub(crate) fn require_policy(&self, action: &Action, info: &str) -> Result<()> {
		if self.inner.policies.policies().has_action(action.as_str()) {
			Ok(())
		} else {
			Err(AuthzError::NoPolicy {
				action: action.clone(),
				info: info.to_string(),
			})
		}
	}

	/// Decides whether the caller in `ctx` may perform `request`.
	///
	/// Returns the decision when allowed. A denial is
	/// [`AuthzError::PermissionDenied`] for an authenticated caller and
	/// [`AuthzError::Unauthenticated`] otherwise. Missing policies, fetchers
	/// or describers are configuration errors. Fetcher and describer errors
	/// are returned unchanged.
	///
	/// Every completed decision is sent to the audit sinks. A cancelled
	/// request produces no decision and no audit record.
	#[instrument(
		skip(self, ctx, request),
		fields(
			action = %request.action,
			resource_key = %request.resource_key,
			scope = %request.scope,
			info = %request.info
		)
	)]
	pub async fn authorize(&self, ctx: &AuthzContext, request: &AuthzRequest) -> Result<AuthzDecision> {
		ctx.check()?;

		let resolved = self
			.require_policy(&request.action, &request.info)
			.and_then(|_| self.object_fetcher(&request.resource_key, &request.info))
			.and_then(|fetcher| {
				self.role_describer(&request.resource_key, &request.info)
					.map(|describer| (fetcher, describer))
			});
		let (fetcher, describer) = match resolved {
			Ok(pair) => pair,
			Err(e) => {
				warn!(error = %e, "authorization misconfigured");
				return Err(e);
			}
		};

		let object = ctx.run(fetcher.fetch_object(ctx, &request.object_id)).await?;
		ctx.check()?;

		let roles = ctx
			.run(describer.describe_roles(ctx, &object, &request.scope))
			.await?;
		ctx.check()?;

		let decision = self.inner.policies.decide(DecisionRequest {
			action: request.action.clone(),
			resource_key: request.resource_key.clone(),
			object_id: request.object_id.clone(),
			scope: request.scope.clone(),
			identity: ctx.identity().cloned(),
			roles,
			default_effect: request.default_effect,
			info: request.info.clone(),
		});

		debug!(
			authz.object_type = object.type_name(),
			authz.roles = ?decision.roles,
			authz.evaluated = ?decision.evaluated_policies,
			authz.effect = %decision.effect,
			authz.reason = %decision.reason,
			"authorization decided"
		);

		for sink in &self.inner.audit_sinks {
			sink.record(ctx, &decision);
		}

		match decision.explanation() {
			None => Ok(decision),
			Some(explanation) => {
				let denial = Denial::new(explanation);
				if ctx.is_authenticated() {
					Err(AuthzError::PermissionDenied(denial))
				} else {
					Err(AuthzError::Unauthenticated(denial))
				}
			}
		}
	}

	/// Resolves `action` for `roles` without fetching anything.
	pub fn determine_effect(&self, action: &Action, roles: &[Role], default_effect: Effect) -> EffectResolution {
		self.inner.policies.determine_effect(action, roles, default_effect)
	}

	/// `role` followed by its ancestors, nearest first.
	pub fn role_hierarchy(&self, role: &Role) -> Vec<Role> {
		self.inner.policies.hierarchy().ancestry(role)
	}

	/// Parent to children adjacency, sorted.
	pub fn role_tree(&self) -> BTreeMap<Role, Vec<Role>> {
		self.inner.policies.hierarchy().tree()
	}

	/// Every defined policy, sorted by action then role.
	pub fn policies(&self) -> Vec<Policy> {
		self.inner.policies.policies().policies()
	}

	/// Plain-text dump of the role forest and policy table for operators.
	pub fn render_debug(&self) -> String {
		crate::debug::render(&self.inner.policies)
	}
}
