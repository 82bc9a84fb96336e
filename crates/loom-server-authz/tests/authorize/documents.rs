// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use http::StatusCode;
use loom_server_authz::{
	AuthzError, AuthzObject, AuthzRequest, DenialExplanation, EndpointSpec, Role,
};

use super::support::{documents_builder, run_authz_cases, AuthzCase, Caller, VIEW};

#[tokio::test]
async fn test_document_authorization() {
	let authz = documents_builder().build().unwrap();

	let cases = vec![
		AuthzCase {
			name: "author_can_view_own_document",
			caller: Caller::User("alice"),
			request: AuthzRequest::new("document", VIEW).with_object_id("doc-1"),
			expected_status: StatusCode::OK,
		},
		AuthzCase {
			name: "other_user_can_view_document",
			caller: Caller::User("bob"),
			request: AuthzRequest::new("document", VIEW).with_object_id("doc-1"),
			expected_status: StatusCode::OK,
		},
		AuthzCase {
			name: "anonymous_cannot_view_document",
			caller: Caller::Anonymous,
			request: AuthzRequest::new("document", VIEW).with_object_id("doc-1"),
			expected_status: StatusCode::UNAUTHORIZED,
		},
		AuthzCase {
			name: "missing_document_is_not_found",
			caller: Caller::User("alice"),
			request: AuthzRequest::new("document", VIEW).with_object_id("doc-404"),
			expected_status: StatusCode::NOT_FOUND,
		},
		AuthzCase {
			name: "undefined_action_is_internal",
			caller: Caller::User("alice"),
			request: AuthzRequest::new("document", "documents.write").with_object_id("doc-1"),
			expected_status: StatusCode::INTERNAL_SERVER_ERROR,
		},
		AuthzCase {
			name: "integer_id_is_internal",
			caller: Caller::User("alice"),
			request: AuthzRequest::new("document", VIEW).with_object_id(1i64),
			expected_status: StatusCode::INTERNAL_SERVER_ERROR,
		},
		AuthzCase {
			name: "unknown_resource_key_is_internal",
			caller: Caller::User("alice"),
			request: AuthzRequest::new("folder", VIEW).with_object_id("doc-1"),
			expected_status: StatusCode::INTERNAL_SERVER_ERROR,
		},
	];

	run_authz_cases(&authz, &cases).await;
}

#[tokio::test]
async fn test_author_holds_admin_role() {
	let authz = documents_builder().build().unwrap();
	let request = AuthzRequest::new("document", VIEW).with_object_id("doc-2");

	let author = authz
		.authorize(&Caller::User("bob").context(), &request)
		.await
		.unwrap();
	assert_eq!(author.roles, vec![Role::new("admin")]);

	let reader = authz
		.authorize(&Caller::User("alice").context(), &request)
		.await
		.unwrap();
	assert_eq!(reader.roles, vec![Role::new("standard")]);
}

#[tokio::test]
async fn test_anonymous_denial_explains_no_roles() {
	let authz = documents_builder().build().unwrap();
	let request = AuthzRequest::new("document", VIEW).with_object_id("doc-1");

	let err = authz
		.authorize(&Caller::Anonymous.context(), &request)
		.await
		.unwrap_err();
	match &err {
		AuthzError::Unauthenticated(denial) => {
			assert_eq!(denial.explanation(), &DenialExplanation::NoRoles)
		}
		other => panic!("expected unauthenticated, got {other:?}"),
	}
	assert!(err.is_denial());
	assert!(!err.is_configuration());
}

#[tokio::test]
async fn test_undefined_action_is_not_a_denial() {
	let authz = documents_builder().build().unwrap();
	let request = AuthzRequest::new("document", "documents.write").with_object_id("doc-1");

	let err = authz
		.authorize(&Caller::User("alice").context(), &request)
		.await
		.unwrap_err();
	assert!(matches!(err, AuthzError::NoPolicy { .. }));
	assert!(!err.is_denial());
	assert!(err.user_message().is_none());
}

#[tokio::test]
async fn test_wildcard_fallback() {
	let authz = documents_builder()
		.policy(loom_server_authz::Effect::Allow, "member", "folders.list")
		.object_fetcher_fn("*", |_ctx, _id| async { Ok(AuthzObject::unit()) })
		.role_describer_fn("*", |ctx, _obj, _scope| async move {
			Ok(if ctx.is_authenticated() {
				vec![Role::new("member")]
			} else {
				Vec::new()
			})
		})
		.build()
		.unwrap();

	let cases = vec![
		AuthzCase {
			name: "unregistered_key_uses_wildcard",
			caller: Caller::User("carol"),
			request: AuthzRequest::new("folder", "folders.list"),
			expected_status: StatusCode::OK,
		},
		AuthzCase {
			name: "registered_key_skips_wildcard",
			caller: Caller::User("carol"),
			request: AuthzRequest::new("document", "folders.list").with_object_id("doc-1"),
			expected_status: StatusCode::FORBIDDEN,
		},
	];

	run_authz_cases(&authz, &cases).await;
}

#[test]
fn test_validate_endpoints_before_serving() {
	let authz = documents_builder().build().unwrap();

	let endpoints = [
		EndpointSpec::new("Documents.Get", VIEW).with_resource_key("document"),
		EndpointSpec::unauthorized("Health.Check"),
	];
	assert!(authz.validate_endpoints(&endpoints).is_ok());

	let broken = [
		EndpointSpec::new("Documents.Update", "documents.write").with_resource_key("document"),
		EndpointSpec::new("Folders.Get", VIEW),
	];
	let errors = authz.validate_endpoints(&broken).unwrap_err();
	let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
	assert_eq!(
		messages,
		vec![
			"authz error: no policies configured for 'documents.write' on Documents.Update",
			"authz error: no object fetcher for key '*' on Folders.Get",
			"authz error: no role describer for key '*' on Folders.Get",
		]
	);
}
