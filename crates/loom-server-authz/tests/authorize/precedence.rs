// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use http::StatusCode;
use loom_server_authz::common::{crud_builder, ADMIN, DELETE, EDITOR, READ, UPDATE, VIEWER};
use loom_server_authz::{
	Action, AuthorizerBuilder, AuthzObject, AuthzRequest, Effect, Role,
};
use proptest::prelude::*;

use super::support::{run_authz_cases, AuthzCase, Caller};

const WRITE: &str = "documents.write";

/// Every caller on `key` holds `roles`, in the given order.
fn with_roles(builder: AuthorizerBuilder, key: &str, roles: Vec<Role>) -> AuthorizerBuilder {
	builder
		.object_fetcher_fn(key, |_ctx, _id| async { Ok(AuthzObject::unit()) })
		.role_describer_fn(key, move |_ctx, _obj, _scope| {
			let roles = roles.clone();
			async move { Ok(roles) }
		})
}

#[tokio::test]
async fn test_deny_wins_regardless_of_default_and_order() {
	for roles in [
		vec![Role::new("editor"), Role::new("suspended")],
		vec![Role::new("suspended"), Role::new("editor")],
	] {
		let authz = with_roles(AuthorizerBuilder::new(), "*", roles.clone())
			.policy(Effect::Allow, "editor", WRITE)
			.policy(Effect::Deny, "suspended", WRITE)
			.build()
			.unwrap();

		for default_effect in [Effect::Allow, Effect::Deny] {
			let request = AuthzRequest::new("document", WRITE).with_default_effect(default_effect);
			let err = authz
				.authorize(&Caller::User("alice").context(), &request)
				.await
				.unwrap_err();
			assert_eq!(
				err.status(),
				StatusCode::FORBIDDEN,
				"roles {roles:?} default {default_effect}"
			);
		}
	}
}

#[tokio::test]
async fn test_deny_on_ancestor_overrides_allow() {
	let authz = with_roles(AuthorizerBuilder::new(), "*", vec![Role::new("owner")])
		.role_hierarchy(["owner", "editor", "restricted"])
		.policy(Effect::Allow, "owner", WRITE)
		.policy(Effect::Deny, "restricted", WRITE)
		.build()
		.unwrap();

	let request = AuthzRequest::new("document", WRITE);
	let err = authz
		.authorize(&Caller::User("alice").context(), &request)
		.await
		.unwrap_err();
	assert_eq!(
		err.user_message().as_deref(),
		Some("Access denied: explicitly denied by policy")
	);
}

#[tokio::test]
async fn test_crud_preset() {
	let authz = with_roles(crud_builder(), "project", vec![EDITOR])
		.build()
		.unwrap();
	let admin = with_roles(crud_builder(), "project", vec![ADMIN])
		.build()
		.unwrap();
	let viewer = with_roles(crud_builder(), "project", vec![VIEWER])
		.build()
		.unwrap();

	let caller = Caller::User("alice");
	let case = |name, action: Action, expected_status| AuthzCase {
		name,
		caller,
		request: AuthzRequest::new("project", action),
		expected_status,
	};

	run_authz_cases(
		&authz,
		&[
			case("editor_can_update", UPDATE, StatusCode::OK),
			case("editor_can_read", READ, StatusCode::OK),
			case("editor_cannot_delete", DELETE, StatusCode::FORBIDDEN),
		],
	)
	.await;
	run_authz_cases(&admin, &[case("admin_can_delete", DELETE, StatusCode::OK)]).await;
	run_authz_cases(
		&viewer,
		&[
			case("viewer_can_read", READ, StatusCode::OK),
			case("viewer_cannot_update", UPDATE, StatusCode::FORBIDDEN),
		],
	)
	.await;
}

fn role_names() -> impl Strategy<Value = Vec<String>> {
	prop::collection::vec(prop::sample::select(vec!["viewer", "editor", "guest", "bot"]), 0..4)
		.prop_map(|names| names.into_iter().map(String::from).collect())
}

proptest! {
	#[test]
	fn suspended_is_always_denied(mut others in role_names(), position in 0usize..5, allow_default in any::<bool>()) {
		let authz = AuthorizerBuilder::new()
			.role_hierarchy(["editor", "viewer"])
			.policy(Effect::Allow, "viewer", WRITE)
			.policy(Effect::Deny, "suspended", WRITE)
			.build()
			.unwrap();

		let position = position.min(others.len());
		others.insert(position, "suspended".to_string());
		let roles: Vec<Role> = others.into_iter().map(Role::new).collect();
		let default_effect = if allow_default { Effect::Allow } else { Effect::Deny };

		let resolution = authz.determine_effect(&Action::new(WRITE), &roles, default_effect);
		prop_assert_eq!(resolution.effect, Effect::Deny);
	}
}
