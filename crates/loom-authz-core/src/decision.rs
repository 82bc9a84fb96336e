// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Decision records.
//!
//! An [`AuthzDecision`] is what operators see in the audit trail: every input,
//! every matched policy and the internal reason. A [`DenialExplanation`] is the
//! much smaller text shown to the caller, which never names a role.

use serde::{Serialize, Serializer};
use std::fmt;

use crate::effect::Effect;
use crate::policy::PolicyEvaluation;
use crate::types::{Action, Identity, ObjectId, Role, Scope};

/// Inputs to [`PolicySet::decide`](crate::PolicySet::decide).
#[derive(Debug, Clone)]
pub struct DecisionRequest {
	pub action: Action,
	pub resource_key: String,
	pub object_id: ObjectId,
	pub scope: Scope,
	pub identity: Option<Identity>,
	/// Roles as returned by the describer, before hierarchy expansion.
	pub roles: Vec<Role>,
	pub default_effect: Effect,
	pub info: String,
}

/// Internal reason for a decision, recorded for operators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecisionReason {
	AllowedByPolicy,
	NoRoles,
	DeniedByPolicy,
	ExplicitlyDenied { role: Role },
}

impl DecisionReason {
	pub fn for_outcome(effect: Effect, roles: &[Role], evaluated: &[PolicyEvaluation]) -> Self {
		if effect.is_allow() {
			return DecisionReason::AllowedByPolicy;
		}
		if roles.is_empty() {
			return DecisionReason::NoRoles;
		}
		match evaluated.iter().find(|e| e.effect.is_deny()) {
			Some(denied) => DecisionReason::ExplicitlyDenied {
				role: denied.role.clone(),
			},
			None => DecisionReason::DeniedByPolicy,
		}
	}
}

impl fmt::Display for DecisionReason {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			DecisionReason::AllowedByPolicy => f.write_str("allowed by policy"),
			DecisionReason::NoRoles => f.write_str("no roles"),
			DecisionReason::DeniedByPolicy => f.write_str("denied by policy"),
			DecisionReason::ExplicitlyDenied { role } => {
				write!(f, "explicitly denied by role '{role}'")
			}
		}
	}
}

impl Serialize for DecisionReason {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}

/// Caller-facing account of a denial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenialExplanation {
	NoRoles,
	ExplicitlyDenied,
	NotExplicitlyAllowed { action: Action },
}

impl fmt::Display for DenialExplanation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			DenialExplanation::NoRoles => f.write_str("no roles assigned"),
			DenialExplanation::ExplicitlyDenied => f.write_str("explicitly denied by policy"),
			DenialExplanation::NotExplicitlyAllowed { action } => {
				write!(f, "action '{action}' not explicitly allowed (default: deny)")
			}
		}
	}
}

/// Complete record of one authorization decision.
///
/// Contains no timestamps so identical inputs yield identical records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthzDecision {
	pub action: Action,
	pub resource_key: String,
	pub object_id: ObjectId,
	pub scope: Scope,
	pub identity: Option<Identity>,
	pub roles: Vec<Role>,
	pub evaluated_policies: Vec<PolicyEvaluation>,
	pub effect: Effect,
	pub default_effect: Effect,
	pub reason: DecisionReason,
	/// Free-form operation description, e.g. the RPC method name.
	pub info: String,
}

impl AuthzDecision {
	pub fn is_allowed(&self) -> bool {
		self.effect.is_allow()
	}

	pub fn is_authenticated(&self) -> bool {
		self.identity.is_some()
	}

	/// The explanation to show the caller, or `None` if the request was allowed.
	pub fn explanation(&self) -> Option<DenialExplanation> {
		match &self.reason {
			DecisionReason::AllowedByPolicy => None,
			DecisionReason::NoRoles => Some(DenialExplanation::NoRoles),
			DecisionReason::ExplicitlyDenied { .. } => Some(DenialExplanation::ExplicitlyDenied),
			DecisionReason::DeniedByPolicy => Some(DenialExplanation::NotExplicitlyAllowed {
				action: self.action.clone(),
			}),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn decision(reason: DecisionReason, effect: Effect) -> AuthzDecision {
		AuthzDecision {
			action: Action::new("documents.write"),
			resource_key: "document".to_string(),
			object_id: ObjectId::from("doc-1"),
			scope: Scope::GLOBAL,
			identity: Some(Identity::new("sub-1", "google")),
			roles: vec!["standard".into()],
			evaluated_policies: Vec::new(),
			effect,
			default_effect: Effect::Deny,
			reason,
			info: "Documents/Write".to_string(),
		}
	}

	#[test]
	fn reason_strings() {
		assert_eq!(DecisionReason::AllowedByPolicy.to_string(), "allowed by policy");
		assert_eq!(DecisionReason::NoRoles.to_string(), "no roles");
		assert_eq!(DecisionReason::DeniedByPolicy.to_string(), "denied by policy");
		assert_eq!(
			DecisionReason::ExplicitlyDenied {
				role: "suspended".into()
			}
			.to_string(),
			"explicitly denied by role 'suspended'"
		);
	}

	#[test]
	fn reason_for_outcome() {
		let deny = PolicyEvaluation {
			role: "suspended".into(),
			effect: Effect::Deny,
		};
		let roles = vec![Role::from("suspended")];
		assert_eq!(
			DecisionReason::for_outcome(Effect::Allow, &roles, &[]),
			DecisionReason::AllowedByPolicy
		);
		assert_eq!(
			DecisionReason::for_outcome(Effect::Deny, &[], &[]),
			DecisionReason::NoRoles
		);
		assert_eq!(
			DecisionReason::for_outcome(Effect::Deny, &roles, &[]),
			DecisionReason::DeniedByPolicy
		);
		assert_eq!(
			DecisionReason::for_outcome(Effect::Deny, &roles, &[deny]),
			DecisionReason::ExplicitlyDenied {
				role: "suspended".into()
			}
		);
	}

	#[test]
	fn explanation_hides_role() {
		let d = decision(
			DecisionReason::ExplicitlyDenied {
				role: "suspended".into(),
			},
			Effect::Deny,
		);
		let text = d.explanation().unwrap().to_string();
		assert_eq!(text, "explicitly denied by policy");
		assert!(!text.contains("suspended"));
	}

	#[test]
	fn explanation_for_default_deny_names_action() {
		let d = decision(DecisionReason::DeniedByPolicy, Effect::Deny);
		assert_eq!(
			d.explanation().unwrap().to_string(),
			"action 'documents.write' not explicitly allowed (default: deny)"
		);
	}

	#[test]
	fn allowed_has_no_explanation() {
		let d = decision(DecisionReason::AllowedByPolicy, Effect::Allow);
		assert!(d.is_allowed());
		assert!(d.explanation().is_none());
	}

	#[test]
	fn serializes_reason_as_text() {
		let d = decision(DecisionReason::NoRoles, Effect::Deny);
		let json = serde_json::to_value(&d).unwrap();
		assert_eq!(json["reason"], "no roles");
		assert_eq!(json["effect"], "deny");
		assert_eq!(json["object_id"], "doc-1");
		assert_eq!(json["identity"]["subject"], "sub-1");
	}
}
