// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Role-based authorization core for Loom.
//!
//! This crate holds the pure, synchronous half of the authorization engine:
//!
//! - [`PolicyStore`]: `(action, role) -> effect` rules
//! - [`RoleHierarchy`]: single-parent role inheritance with cycle rejection
//! - [`PolicySet::determine_effect`]: IAM-style effect resolution (deny wins)
//! - [`AuthzDecision`]: the audit record of a decision
//!
//! Object fetching, role description and auditing live in `loom-server-authz`.

pub mod decision;
pub mod effect;
pub mod error;
pub mod evaluate;
pub mod hierarchy;
pub mod policy;
pub mod types;

pub use decision::{AuthzDecision, DecisionReason, DecisionRequest, DenialExplanation};
pub use effect::Effect;
pub use error::{HierarchyError, ParseEffectError};
pub use evaluate::{EffectResolution, PolicySet};
pub use hierarchy::RoleHierarchy;
pub use policy::{Policy, PolicyEvaluation, PolicyStore};
pub use types::{Action, Identity, ObjectId, Role, Scope};
