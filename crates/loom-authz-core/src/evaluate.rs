// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Effect resolution over a policy table and role hierarchy.
//!
//! Precedence follows IAM semantics:
//!
//! 1. Any matched `Deny` wins.
//! 2. Otherwise any matched `Allow` wins.
//! 3. Otherwise the endpoint's default effect applies.
//!
//! Held roles are expanded through the hierarchy first, so a role picks up
//! every policy granted to its ancestors.

use tracing::instrument;

use crate::decision::{AuthzDecision, DecisionReason, DecisionRequest};
use crate::effect::Effect;
use crate::error::HierarchyError;
use crate::hierarchy::RoleHierarchy;
use crate::policy::{PolicyEvaluation, PolicyStore};
use crate::types::{Action, Role};

/// Result of [`PolicySet::determine_effect`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectResolution {
	pub effect: Effect,
	/// Every `(role, effect)` that matched, in expansion order. A policy
	/// reachable through several held roles appears once per path.
	pub evaluated: Vec<PolicyEvaluation>,
}

/// Policies plus the hierarchy they are evaluated against.
#[derive(Debug, Clone, Default)]
pub struct PolicySet {
	policies: PolicyStore,
	hierarchy: RoleHierarchy,
}

impl PolicySet {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn from_parts(policies: PolicyStore, hierarchy: RoleHierarchy) -> Self {
		Self {
			policies,
			hierarchy,
		}
	}

	pub fn define_policy(
		&mut self,
		effect: Effect,
		role: impl Into<Role>,
		action: impl Into<Action>,
	) -> Option<Effect> {
		self.policies.define(effect, role, action)
	}

	pub fn set_role_hierarchy<I, R>(&mut self, chain: I) -> Result<(), HierarchyError>
	where
		I: IntoIterator<Item = R>,
		R: Into<Role>,
	{
		self.hierarchy.set_chain(chain)
	}

	pub fn policies(&self) -> &PolicyStore {
		&self.policies
	}

	pub fn hierarchy(&self) -> &RoleHierarchy {
		&self.hierarchy
	}

	/// Resolves the effect of `action` for a caller holding `roles`.
	///
	/// With no held roles the default is returned with nothing evaluated.
	#[instrument(
		level = "trace",
		skip(self, roles),
		fields(action = %action, role_count = roles.len(), default = %default_effect)
	)]
	pub fn determine_effect(
		&self,
		action: &Action,
		roles: &[Role],
		default_effect: Effect,
	) -> EffectResolution {
		let mut evaluated = Vec::new();
		for held in roles {
			for role in self.hierarchy.ancestry(held) {
				if let Some(effect) = self.policies.get(action.as_str(), role.as_str()) {
					evaluated.push(PolicyEvaluation { role, effect });
				}
			}
		}

		let effect = Effect::combine(evaluated.iter().map(|e| e.effect), default_effect);
		EffectResolution { effect, evaluated }
	}

	/// Produces the full decision record for a request whose roles are known.
	///
	/// A caller without roles is denied outright, whatever the default.
	pub fn decide(&self, request: DecisionRequest) -> AuthzDecision {
		let (effect, evaluated) = if request.roles.is_empty() {
			(Effect::Deny, Vec::new())
		} else {
			let resolution =
				self.determine_effect(&request.action, &request.roles, request.default_effect);
			(resolution.effect, resolution.evaluated)
		};

		let reason = DecisionReason::for_outcome(effect, &request.roles, &evaluated);
		AuthzDecision {
			action: request.action,
			resource_key: request.resource_key,
			object_id: request.object_id,
			scope: request.scope,
			identity: request.identity,
			roles: request.roles,
			evaluated_policies: evaluated,
			effect,
			default_effect: request.default_effect,
			reason,
			info: request.info,
		}
	}
}
