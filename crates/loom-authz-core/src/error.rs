// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use thiserror::Error;

use crate::types::Role;

/// Errors raised while declaring a role hierarchy.
///
/// A failed declaration leaves the hierarchy exactly as it was before the call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HierarchyError {
	#[error("role '{role}' already has parent '{parent}'")]
	AlreadyParented { role: Role, parent: Role },

	#[error("role '{role}' appears more than once in the hierarchy chain")]
	CycleInChain { role: Role },

	#[error("role '{role}' would create a cycle in the role hierarchy")]
	CycleInHierarchy { role: Role },

	#[error("role names in a hierarchy must not be empty")]
	EmptyRole,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid effect '{0}': expected 'allow' or 'deny'")]
pub struct ParseEffectError(pub String);
