// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Policy storage: a mapping from `(action, role)` to an [`Effect`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::effect::Effect;
use crate::types::{Action, Role};

/// A single `(action, role, effect)` rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Policy {
	pub action: Action,
	pub role: Role,
	pub effect: Effect,
}

impl Policy {
	pub fn new(effect: Effect, role: impl Into<Role>, action: impl Into<Action>) -> Self {
		Self {
			action: action.into(),
			role: role.into(),
			effect,
		}
	}
}

/// A policy that matched during evaluation, recorded for auditing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyEvaluation {
	pub role: Role,
	pub effect: Effect,
}

/// Action-indexed policy table. At most one effect exists per `(action, role)`.
#[derive(Debug, Clone, Default)]
pub struct PolicyStore {
	policies: HashMap<Action, HashMap<Role, Effect>>,
}

impl PolicyStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Records `effect` for `(action, role)`, returning the effect it replaced.
	pub fn define(
		&mut self,
		effect: Effect,
		role: impl Into<Role>,
		action: impl Into<Action>,
	) -> Option<Effect> {
		self.policies
			.entry(action.into())
			.or_default()
			.insert(role.into(), effect)
	}

	pub fn insert(&mut self, policy: Policy) -> Option<Effect> {
		self.define(policy.effect, policy.role, policy.action)
	}

	pub fn get(&self, action: &str, role: &str) -> Option<Effect> {
		self.policies.get(action)?.get(role).copied()
	}

	/// Returns true if any policy mentions `action`.
	pub fn has_action(&self, action: &str) -> bool {
		self.policies.contains_key(action)
	}

	/// Number of `(action, role)` rules.
	pub fn len(&self) -> usize {
		self.policies.values().map(HashMap::len).sum()
	}

	pub fn is_empty(&self) -> bool {
		self.policies.is_empty()
	}

	/// All rules sorted by action then role.
	pub fn policies(&self) -> Vec<Policy> {
		let mut out: Vec<Policy> = self
			.policies
			.iter()
			.flat_map(|(action, roles)| {
				roles.iter().map(move |(role, effect)| Policy {
					action: action.clone(),
					role: role.clone(),
					effect: *effect,
				})
			})
			.collect();
		out.sort_by(|a, b| a.action.cmp(&b.action).then_with(|| a.role.cmp(&b.role)));
		out
	}

	/// All actions with at least one rule, sorted.
	pub fn actions(&self) -> Vec<Action> {
		let mut actions: Vec<Action> = self.policies.keys().cloned().collect();
		actions.sort();
		actions
	}
}

impl FromIterator<Policy> for PolicyStore {
	fn from_iter<I: IntoIterator<Item = Policy>>(iter: I) -> Self {
		let mut store = PolicyStore::new();
		for policy in iter {
			store.insert(policy);
		}
		store
	}
}
