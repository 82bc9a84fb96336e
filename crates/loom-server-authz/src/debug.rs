// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Operator-facing text dump of the authorization configuration.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;

use loom_authz_core::{PolicySet, Role};

const ACTION_PADDING: usize = 20;

pub(crate) fn render(set: &PolicySet) -> String {
	let mut out = String::new();
	out.push_str("Authz Configuration\n");
	out.push_str("===================\n\n\n");

	out.push_str("Role Hierarchy\n");
	out.push_str("--------------\n\n");

	let hierarchy = set.hierarchy();
	let mut roots: BTreeSet<Role> = hierarchy.roots().into_iter().collect();
	for policy in set.policies().policies() {
		if hierarchy.parent(policy.role.as_str()).is_none() {
			roots.insert(policy.role);
		}
	}

	let tree = hierarchy.tree();
	for root in &roots {
		let _ = writeln!(out, "  {root}");
		write_children(&mut out, &tree, root, "  ");
	}

	out.push_str("\n\n\nPolicies\n");
	out.push_str("--------\n\n");

	let policies = set.policies().policies();
	for action in set.policies().actions() {
		let _ = writeln!(out, "  {:<width$}", action.as_str(), width = ACTION_PADDING);
		for policy in policies.iter().filter(|p| p.action == action) {
			let _ = writeln!(out, "    {} {}", policy.effect, policy.role);
		}
		out.push('\n');
	}

	out
}

fn write_children(out: &mut String, tree: &BTreeMap<Role, Vec<Role>>, role: &Role, prefix: &str) {
	let Some(children) = tree.get(role) else {
		return;
	};
	for (i, child) in children.iter().enumerate() {
		let tail = i + 1 == children.len();
		let branch = if tail { "└── " } else { "├── " };
		let _ = writeln!(out, "{prefix}{branch}{child}");
		let extension = if tail { "    " } else { "│   " };
		write_children(out, tree, child, &format!("{prefix}{extension}"));
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use loom_authz_core::Effect;

	#[test]
	fn renders_forest_and_policies() {
		let mut set = PolicySet::new();
		set.set_role_hierarchy(["admin", "editor", "viewer"]).unwrap();
		set.set_role_hierarchy(["commenter", "viewer"]).unwrap();
		set.define_policy(Effect::Allow, "viewer", "read");
		set.define_policy(Effect::Allow, "editor", "write");
		set.define_policy(Effect::Deny, "suspended", "write");

		let rendered = render(&set);
		let expected_tree = "\
  suspended
  viewer
  ├── commenter
  └── editor
      └── admin
";
		assert!(rendered.starts_with("Authz Configuration\n===================\n\n\nRole Hierarchy\n--------------\n\n"));
		assert!(rendered.contains(expected_tree), "{rendered}");

		let policies = rendered.split("Policies\n--------\n\n").nth(1).unwrap();
		let lines: Vec<&str> = policies.lines().map(str::trim_end).collect();
		assert_eq!(
			lines,
			vec![
				"  read",
				"    ALLOW viewer",
				"",
				"  write",
				"    ALLOW editor",
				"    DENY suspended",
				"",
			]
		);
	}

	#[test]
	fn empty_configuration() {
		let rendered = render(&PolicySet::new());
		assert!(rendered.ends_with("Policies\n--------\n\n"));
	}

	#[test]
	fn output_is_deterministic() {
		let mut set = PolicySet::new();
		for role in ["c", "a", "b"] {
			set.define_policy(Effect::Allow, role, "x");
		}
		assert_eq!(render(&set), render(&set.clone()));
	}
}
