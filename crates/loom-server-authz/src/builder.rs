// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration phase for an [`Authorizer`].
//!
//! Everything is declared on an [`AuthorizerBuilder`] and published at once by
//! [`AuthorizerBuilder::build`]. The resulting authorizer is immutable, so it
//! can be shared across request tasks without locks.

use std::future::Future;
use std::sync::Arc;

use loom_authz_core::{
	Action, AuthzDecision, Effect, HierarchyError, ObjectId, PolicySet, Role, Scope,
};
use tracing::{debug, info, warn};

use crate::audit::{AuditSink, FnAuditSink};
use crate::authorizer::{Authorizer, AuthorizerInner};
use crate::context::AuthzContext;
use crate::error::{AuthzError, Result};
use crate::object::AuthzObject;
use crate::registry::Registry;
use crate::resolver::{FnObjectFetcher, FnRoleDescriber, ObjectFetcher, RoleDescriber};
use crate::typed::{AsObjectFetcher, AsRoleDescriber, FromObjectId, TypedObjectFetcher, TypedRoleDescriber};

#[derive(Default)]
pub struct AuthorizerBuilder {
	policies: PolicySet,
	fetchers: Registry<Arc<dyn ObjectFetcher>>,
	describers: Registry<Arc<dyn RoleDescriber>>,
	audit_sinks: Vec<Arc<dyn AuditSink>>,
	hierarchy_errors: Vec<HierarchyError>,
}

impl AuthorizerBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	/// Declares `effect` for `role` on `action`, replacing any earlier effect.
	pub fn policy(mut self, effect: Effect, role: impl Into<Role>, action: impl Into<Action>) -> Self {
		let role = role.into();
		let action = action.into();
		debug!(%effect, %role, %action, "defining policy");
		if let Some(previous) = self.policies.define_policy(effect, role.clone(), action.clone()) {
			if previous != effect {
				debug!(%role, %action, %previous, %effect, "policy overwritten");
			}
		}
		self
	}

	/// Declares a chain, most privileged first: each role's parent is the
	/// next one. A rejected chain is reported by [`build`](Self::build).
	pub fn role_hierarchy<I, R>(mut self, chain: I) -> Self
	where
		I: IntoIterator<Item = R>,
		R: Into<Role>,
	{
		if let Err(e) = self.declare_hierarchy(chain) {
			self.hierarchy_errors.push(e);
		}
		self
	}

	/// Like [`role_hierarchy`](Self::role_hierarchy) but fails immediately.
	pub fn try_role_hierarchy<I, R>(mut self, chain: I) -> std::result::Result<Self, HierarchyError>
	where
		I: IntoIterator<Item = R>,
		R: Into<Role>,
	{
		self.declare_hierarchy(chain)?;
		Ok(self)
	}

	fn declare_hierarchy<I, R>(&mut self, chain: I) -> std::result::Result<(), HierarchyError>
	where
		I: IntoIterator<Item = R>,
		R: Into<Role>,
	{
		let chain: Vec<Role> = chain.into_iter().map(Into::into).collect();
		debug!(chain = ?chain, "setting role hierarchy");
		self.policies.set_role_hierarchy(chain).map_err(|e| {
			warn!(error = %e, "rejected role hierarchy");
			e
		})
	}

	/// Registers a fetcher for `resource_key`; `"*"` is the fallback.
	pub fn object_fetcher(mut self, resource_key: impl Into<String>, fetcher: impl ObjectFetcher + 'static) -> Self {
		let resource_key = resource_key.into();
		debug!(resource_key = %resource_key, "registering object fetcher");
		self.fetchers.insert(resource_key, Arc::new(fetcher));
		self
	}

	/// Registers a describer for `resource_key`; `"*"` is the fallback.
	pub fn role_describer(mut self, resource_key: impl Into<String>, describer: impl RoleDescriber + 'static) -> Self {
		let resource_key = resource_key.into();
		debug!(resource_key = %resource_key, "registering role describer");
		self.describers.insert(resource_key, Arc::new(describer));
		self
	}

	pub fn object_fetcher_fn<F, Fut>(self, resource_key: impl Into<String>, f: F) -> Self
	where
		F: Fn(AuthzContext, ObjectId) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = Result<AuthzObject>> + Send + 'static,
	{
		self.object_fetcher(resource_key, FnObjectFetcher::new(f))
	}

	pub fn role_describer_fn<F, Fut>(self, resource_key: impl Into<String>, f: F) -> Self
	where
		F: Fn(AuthzContext, AuthzObject, Scope) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = Result<Vec<Role>>> + Send + 'static,
	{
		self.role_describer(resource_key, FnRoleDescriber::new(f))
	}

	/// Registers a fetcher that receives its key already converted to `K`.
	pub fn typed_object_fetcher<K, T, F>(self, resource_key: impl Into<String>, fetcher: F) -> Self
	where
		K: FromObjectId,
		T: Send + Sync + 'static,
		F: TypedObjectFetcher<K, T> + 'static,
	{
		self.object_fetcher(resource_key, AsObjectFetcher::<F, K, T>::new(fetcher))
	}

	/// Registers a describer that only accepts objects of type `T`.
	pub fn typed_role_describer<T, D>(self, resource_key: impl Into<String>, describer: D) -> Self
	where
		T: Send + Sync + 'static,
		D: TypedRoleDescriber<T> + 'static,
	{
		self.role_describer(resource_key, AsRoleDescriber::<D, T>::new(describer))
	}

	/// Registers a matching fetcher and describer under one key.
	pub fn type_registration<K, T, F, D>(self, resource_key: impl Into<String>, fetcher: F, describer: D) -> Self
	where
		K: FromObjectId,
		T: Send + Sync + 'static,
		F: TypedObjectFetcher<K, T> + 'static,
		D: TypedRoleDescriber<T> + 'static,
	{
		let resource_key = resource_key.into();
		self.typed_object_fetcher::<K, T, F>(resource_key.clone(), fetcher)
			.typed_role_describer::<T, D>(resource_key, describer)
	}

	/// Adds a sink that receives every completed decision.
	pub fn audit_sink(mut self, sink: impl AuditSink + 'static) -> Self {
		self.audit_sinks.push(Arc::new(sink));
		self
	}

	pub fn audit_fn<F>(self, f: F) -> Self
	where
		F: Fn(&AuthzContext, &AuthzDecision) + Send + Sync + 'static,
	{
		self.audit_sink(FnAuditSink::new(f))
	}

	/// Publishes the authorizer.
	///
	/// # Errors
	///
	/// Returns [`AuthzError::Hierarchy`] for the first rejected
	/// [`role_hierarchy`](Self::role_hierarchy) chain.
	pub fn build(self) -> Result<Authorizer> {
		if let Some(first) = self.hierarchy_errors.into_iter().next() {
			return Err(AuthzError::Hierarchy(first));
		}

		info!(
			policies = self.policies.policies().len(),
			hierarchy_edges = self.policies.hierarchy().len(),
			object_fetchers = self.fetchers.len(),
			role_describers = self.describers.len(),
			audit_sinks = self.audit_sinks.len(),
			"authorizer built"
		);

		Ok(Authorizer::from_inner(AuthorizerInner {
			policies: self.policies,
			fetchers: self.fetchers,
			describers: self.describers,
			audit_sinks: self.audit_sinks,
		}))
	}
}
