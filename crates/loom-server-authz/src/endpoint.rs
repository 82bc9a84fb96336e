// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Static per-endpoint authorization declarations.
//!
//! A transport declares one [`EndpointSpec`] per route or RPC method and
//! checks the whole set with [`Authorizer::validate_endpoints`] at startup,
//! so missing policies and resolvers are found before the first request.

use loom_authz_core::{Action, AuthzDecision, Effect, ObjectId, Scope};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::authorizer::{Authorizer, AuthzRequest};
use crate::context::AuthzContext;
use crate::error::{AuthzError, Result};
use crate::registry::WILDCARD_KEY;

fn wildcard_key() -> String {
	WILDCARD_KEY.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointSpec {
	/// Endpoint name used in error messages, e.g. `DocumentService.Update`.
	pub info: String,
	#[serde(default = "wildcard_key")]
	pub resource_key: String,
	/// Empty when the endpoint is not authorized by this engine.
	#[serde(default)]
	pub action: Action,
	#[serde(default)]
	pub default_effect: Effect,
}

impl EndpointSpec {
	pub fn new(info: impl Into<String>, action: impl Into<Action>) -> Self {
		Self {
			info: info.into(),
			resource_key: wildcard_key(),
			action: action.into(),
			default_effect: Effect::Deny,
		}
	}

	/// An endpoint that skips authorization.
	pub fn unauthorized(info: impl Into<String>) -> Self {
		Self::new(info, Action::default())
	}

	pub fn with_resource_key(mut self, resource_key: impl Into<String>) -> Self {
		self.resource_key = resource_key.into();
		self
	}

	pub fn with_default_effect(mut self, default_effect: Effect) -> Self {
		self.default_effect = default_effect;
		self
	}

	pub fn is_authorized(&self) -> bool {
		!self.action.is_empty()
	}

	pub fn request(&self, object_id: impl Into<ObjectId>, scope: impl Into<Scope>) -> AuthzRequest {
		AuthzRequest::new(self.resource_key.clone(), self.action.clone())
			.with_object_id(object_id)
			.with_scope(scope)
			.with_default_effect(self.default_effect)
			.with_info(self.info.clone())
	}
}

impl Authorizer {
	/// Reports every endpoint whose action has no policy or whose resource
	/// key resolves to no fetcher or describer.
	pub fn validate_endpoints(&self, endpoints: &[EndpointSpec]) -> std::result::Result<(), Vec<AuthzError>> {
		let mut errors = Vec::new();
		for endpoint in endpoints.iter().filter(|e| e.is_authorized()) {
			debug!(info = %endpoint.info, action = %endpoint.action, "validating endpoint");
			if let Err(e) = self.require_policy(&endpoint.action, &endpoint.info) {
				errors.push(e);
			}
			if let Err(e) = self.object_fetcher(&endpoint.resource_key, &endpoint.info) {
				errors.push(e);
			}
			if let Err(e) = self.role_describer(&endpoint.resource_key, &endpoint.info) {
				errors.push(e);
			}
		}

		if errors.is_empty() {
			info!(endpoints = endpoints.len(), "authorization endpoints validated");
			Ok(())
		} else {
			for e in &errors {
				warn!(error = %e, "endpoint authorization misconfigured");
			}
			Err(errors)
		}
	}

	/// Authorizes a request to `endpoint`. Returns `Ok(None)` without
	/// evaluating anything when the endpoint declares no action.
	pub async fn authorize_endpoint(
		&self,
		ctx: &AuthzContext,
		endpoint: &EndpointSpec,
		object_id: impl Into<ObjectId>,
		scope: impl Into<Scope>,
	) -> Result<Option<AuthzDecision>> {
		if !endpoint.is_authorized() {
			return Ok(None);
		}
		let request = endpoint.request(object_id, scope);
		self.authorize(ctx, &request).await.map(Some)
	}
}
