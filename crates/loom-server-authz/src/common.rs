// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Conventional roles, actions and a CRUD starting point.

use loom_authz_core::{Action, Effect, Role};

use crate::builder::AuthorizerBuilder;

pub const ADMIN: Role = Role::from_static("admin");
pub const EDITOR: Role = Role::from_static("editor");
pub const VIEWER: Role = Role::from_static("viewer");
pub const OWNER: Role = Role::from_static("owner");
pub const USER: Role = Role::from_static("user");

pub const CREATE: Action = Action::from_static("create");
pub const READ: Action = Action::from_static("read");
pub const UPDATE: Action = Action::from_static("update");
pub const DELETE: Action = Action::from_static("delete");
pub const LIST: Action = Action::from_static("list");

/// A builder preloaded with `admin > editor > viewer > user` and CRUD
/// policies: viewers read and list, editors also create and update, admins
/// also delete.
pub fn crud_builder() -> AuthorizerBuilder {
	AuthorizerBuilder::new()
		.role_hierarchy([ADMIN, EDITOR, VIEWER, USER])
		.policy(Effect::Allow, ADMIN, DELETE)
		.policy(Effect::Allow, EDITOR, CREATE)
		.policy(Effect::Allow, EDITOR, READ)
		.policy(Effect::Allow, EDITOR, UPDATE)
		.policy(Effect::Allow, EDITOR, LIST)
		.policy(Effect::Allow, VIEWER, READ)
		.policy(Effect::Allow, VIEWER, LIST)
}
