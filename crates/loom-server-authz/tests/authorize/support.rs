// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use http::StatusCode;
use loom_server_authz::patterns::{describer, map_fetcher};
use loom_server_authz::{
	AuditSink, Authorizer, AuthorizerBuilder, AuthzContext, AuthzDecision, AuthzRequest, Effect,
	Identity, Role,
};

pub const VIEW: &str = "documents.view";

#[derive(Debug, Clone)]
pub struct Document {
	pub author_id: String,
}

pub fn documents() -> HashMap<String, Document> {
	let mut docs = HashMap::new();
	for (id, author) in [("doc-1", "alice"), ("doc-2", "bob")] {
		docs.insert(
			id.to_string(),
			Document {
				author_id: author.to_string(),
			},
		);
	}
	docs
}

/// Authors hold `admin` on their documents, every other signed-in user holds
/// `standard`, anonymous callers hold nothing.
pub fn document_roles() -> impl loom_server_authz::TypedRoleDescriber<Document> {
	describer(|ctx: AuthzContext, doc: Arc<Document>, _scope| async move {
		let roles = match ctx.identity() {
			None => Vec::new(),
			Some(identity) if identity.subject == doc.author_id => vec![Role::new("admin")],
			Some(_) => vec![Role::new("standard")],
		};
		Ok(roles)
	})
}

pub fn documents_builder() -> AuthorizerBuilder {
	Authorizer::builder()
		.policy(Effect::Allow, "admin", VIEW)
		.policy(Effect::Allow, "standard", VIEW)
		.type_registration::<String, Document, _, _>("document", map_fetcher(documents()), document_roles())
}

/// Captures every decision it is handed.
#[derive(Clone, Default)]
pub struct RecordingSink {
	decisions: Arc<Mutex<Vec<AuthzDecision>>>,
}

impl RecordingSink {
	pub fn decisions(&self) -> Vec<AuthzDecision> {
		self.decisions.lock().unwrap().clone()
	}
}

impl AuditSink for RecordingSink {
	fn record(&self, _ctx: &AuthzContext, decision: &AuthzDecision) {
		self.decisions.lock().unwrap().push(decision.clone());
	}
}

#[derive(Debug, Clone, Copy)]
pub enum Caller {
	Anonymous,
	User(&'static str),
}

impl Caller {
	pub fn context(self) -> AuthzContext {
		match self {
			Caller::Anonymous => AuthzContext::anonymous(),
			Caller::User(subject) => {
				AuthzContext::authenticated(Identity::new(subject, "github").with_email(
					format!("{subject}@example.com"),
					true,
				))
			}
		}
	}
}

pub struct AuthzCase {
	pub name: &'static str,
	pub caller: Caller,
	pub request: AuthzRequest,
	pub expected_status: StatusCode,
}

pub async fn run_authz_cases(authz: &Authorizer, cases: &[AuthzCase]) {
	for case in cases {
		let status = match authz.authorize(&case.caller.context(), &case.request).await {
			Ok(_) => StatusCode::OK,
			Err(e) => e.status(),
		};

		assert_eq!(
			status, case.expected_status,
			"Case '{}': {:?} {} on {}",
			case.name, case.caller, case.request.action, case.request.resource_key
		);
	}
}
