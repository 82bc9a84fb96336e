// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Role inheritance forest.
//!
//! Each role has at most one parent and inherits every policy granted to its
//! ancestors. Chains are declared most privileged first: in
//! `["admin", "editor", "viewer"]` the parent of `admin` is `editor`, so admins
//! can do everything editors and viewers can.
//!
//! ```
//! use loom_authz_core::RoleHierarchy;
//!
//! let mut hierarchy = RoleHierarchy::new();
//! hierarchy.set_chain(["admin", "editor", "viewer"]).unwrap();
//! assert_eq!(hierarchy.ancestry(&"admin".into()).len(), 3);
//! ```

use std::collections::{BTreeMap, HashMap};

use crate::error::HierarchyError;
use crate::types::Role;

/// A forest of `child -> parent` edges with no cycles and no re-parenting.
#[derive(Debug, Clone, Default)]
pub struct RoleHierarchy {
	parents: HashMap<Role, Role>,
}

impl RoleHierarchy {
	pub fn new() -> Self {
		Self::default()
	}

	/// Declares a descending chain: each role's parent is the one after it.
	///
	/// Edges are validated in order and committed only if the whole chain is
	/// valid. Re-declaring an existing edge is a no-op.
	///
	/// # Errors
	///
	/// - [`HierarchyError::EmptyRole`] if any name is empty
	/// - [`HierarchyError::AlreadyParented`] if a role already has a different parent
	/// - [`HierarchyError::CycleInChain`] if a role repeats later in the same chain
	/// - [`HierarchyError::CycleInHierarchy`] if the edge would close a cycle
	pub fn set_chain<I, R>(&mut self, chain: I) -> Result<(), HierarchyError>
	where
		I: IntoIterator<Item = R>,
		R: Into<Role>,
	{
		let chain: Vec<Role> = chain.into_iter().map(Into::into).collect();
		if chain.iter().any(Role::is_empty) {
			return Err(HierarchyError::EmptyRole);
		}
		if chain.len() <= 1 {
			return Ok(());
		}

		let mut staged = self.parents.clone();
		for (i, pair) in chain.windows(2).enumerate() {
			let (role, parent) = (&pair[0], &pair[1]);

			let existing = staged.get(role);
			if let Some(existing) = existing {
				if existing != parent {
					return Err(HierarchyError::AlreadyParented {
						role: role.clone(),
						parent: existing.clone(),
					});
				}
			}

			if chain[i + 1..].contains(role) {
				return Err(HierarchyError::CycleInChain { role: role.clone() });
			}

			if existing.is_some() {
				continue;
			}

			if ancestry_in(&staged, parent).contains(role) {
				return Err(HierarchyError::CycleInHierarchy { role: role.clone() });
			}

			staged.insert(role.clone(), parent.clone());
		}

		self.parents = staged;
		Ok(())
	}

	/// The role followed by its ancestors, nearest first.
	pub fn ancestry(&self, role: &Role) -> Vec<Role> {
		ancestry_in(&self.parents, role)
	}

	pub fn parent(&self, role: &str) -> Option<&Role> {
		self.parents.get(role)
	}

	/// Parent to children adjacency, with children sorted.
	pub fn tree(&self) -> BTreeMap<Role, Vec<Role>> {
		let mut tree: BTreeMap<Role, Vec<Role>> = BTreeMap::new();
		for (child, parent) in &self.parents {
			tree.entry(parent.clone()).or_default().push(child.clone());
		}
		for children in tree.values_mut() {
			children.sort();
		}
		tree
	}

	/// Roles that have children but no parent, sorted.
	pub fn roots(&self) -> Vec<Role> {
		let mut roots: Vec<Role> = self
			.parents
			.values()
			.filter(|parent| !self.parents.contains_key(parent.as_str()))
			.cloned()
			.collect();
		roots.sort();
		roots.dedup();
		roots
	}

	/// Number of edges.
	pub fn len(&self) -> usize {
		self.parents.len()
	}

	pub fn is_empty(&self) -> bool {
		self.parents.is_empty()
	}
}

fn ancestry_in(parents: &HashMap<Role, Role>, role: &Role) -> Vec<Role> {
	let mut ancestry = vec![role.clone()];
	let mut current = role;
	while let Some(parent) = parents.get(current) {
		ancestry.push(parent.clone());
		current = parent;
	}
	ancestry
}
