// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use loom_server_authz::audit::{AuditEntry, AuditEventType, AuditPublishError, AuditPublisher};
use loom_server_authz::{
	load_config_with_file, Action, AuthzError, AuthzRequest, DecisionReason, Effect,
	HierarchyError, QueuedAuditSink, Role, TracingAuditSink,
};
use tempfile::NamedTempFile;
use tokio::time::{sleep, Duration};
use tokio_util::sync::CancellationToken;

use super::support::{documents_builder, Caller, RecordingSink, VIEW};

#[derive(Default)]
struct CountingPublisher {
	granted: AtomicUsize,
	denied: AtomicUsize,
}

impl CountingPublisher {
	fn total(&self) -> usize {
		self.granted.load(Ordering::SeqCst) + self.denied.load(Ordering::SeqCst)
	}
}

fn config_file(contents: &str) -> NamedTempFile {
	let mut file = NamedTempFile::new().unwrap();
	file.write_all(contents.as_bytes()).unwrap();
	file
}

#[async_trait]
impl AuditPublisher for CountingPublisher {
	fn name(&self) -> &str {
		"counting"
	}

	async fn publish(&self, entry: Arc<AuditEntry>) -> Result<(), AuditPublishError> {
		match entry.event_type {
			AuditEventType::AccessGranted => self.granted.fetch_add(1, Ordering::SeqCst),
			AuditEventType::AccessDenied => self.denied.fetch_add(1, Ordering::SeqCst),
		};
		Ok(())
	}
}

#[tokio::test]
async fn test_every_decision_is_audited() {
	let sink = RecordingSink::default();
	let authz = documents_builder().audit_sink(sink.clone()).build().unwrap();
	let request = AuthzRequest::new("document", VIEW)
		.with_object_id("doc-1")
		.with_info("Documents.Get");

	assert!(authz
		.authorize(&Caller::User("alice").context(), &request)
		.await
		.is_ok());
	assert!(authz
		.authorize(&Caller::Anonymous.context(), &request)
		.await
		.is_err());

	let decisions = sink.decisions();
	assert_eq!(decisions.len(), 2);
	assert_eq!(decisions[0].reason, DecisionReason::AllowedByPolicy);
	assert_eq!(decisions[0].info, "Documents.Get");
	assert_eq!(decisions[1].reason, DecisionReason::NoRoles);
	assert!(!decisions[1].is_authenticated());
}

#[tokio::test]
async fn test_identical_requests_yield_identical_records() {
	let sink = RecordingSink::default();
	let authz = documents_builder().audit_sink(sink.clone()).build().unwrap();
	let request = AuthzRequest::new("document", VIEW).with_object_id("doc-2");
	let ctx = Caller::User("alice").context();

	let first = authz.authorize(&ctx, &request).await.unwrap();
	let second = authz.authorize(&ctx, &request).await.unwrap();
	assert_eq!(first, second);

	let decisions = sink.decisions();
	assert_eq!(decisions.len(), 2);
	assert_eq!(decisions[0], decisions[1]);
}

#[tokio::test]
async fn test_cancelled_request_is_not_audited() {
	let sink = RecordingSink::default();
	let authz = documents_builder().audit_sink(sink.clone()).build().unwrap();

	let token = CancellationToken::new();
	token.cancel();
	let ctx = Caller::User("alice").context().with_cancellation(token);

	let err = authz
		.authorize(&ctx, &AuthzRequest::new("document", VIEW).with_object_id("doc-1"))
		.await
		.unwrap_err();
	assert!(matches!(err, AuthzError::Cancelled));
	assert!(sink.decisions().is_empty());
}

#[tokio::test]
async fn test_queued_sink_publishes_decisions() {
	let publisher = Arc::new(CountingPublisher::default());
	let queued = QueuedAuditSink::new(
		128,
		Default::default(),
		vec![publisher.clone() as Arc<dyn AuditPublisher>],
	);
	let authz = documents_builder()
		.audit_sink(queued)
		.audit_sink(TracingAuditSink)
		.build()
		.unwrap();

	let request = AuthzRequest::new("document", VIEW).with_object_id("doc-1");
	let _ = authz.authorize(&Caller::User("bob").context(), &request).await;
	let _ = authz.authorize(&Caller::Anonymous.context(), &request).await;
	let _ = authz.authorize(&Caller::Anonymous.context(), &request).await;

	sleep(Duration::from_millis(50)).await;
	assert_eq!(publisher.granted.load(Ordering::SeqCst), 1);
	assert_eq!(publisher.denied.load(Ordering::SeqCst), 2);
}

#[test]
fn test_invalid_hierarchy_fails_build() {
	let err = documents_builder()
		.role_hierarchy(["admin", "standard"])
		.role_hierarchy(["standard", "admin"])
		.build()
		.unwrap_err();
	assert!(matches!(
		err,
		AuthzError::Hierarchy(HierarchyError::CycleInHierarchy { .. })
	));
	assert_eq!(err.status(), http::StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_config_file_extends_builder() {
	let file = config_file(
		r#"
role_hierarchies = [["admin", "standard"]]

[[policies]]
effect = "deny"
role = "standard"
action = "documents.view"
"#,
	);

	let config = load_config_with_file(file.path()).unwrap();
	let authz = config.apply(documents_builder()).build().unwrap();
	let request = AuthzRequest::new("document", VIEW).with_object_id("doc-1");

	// The file's deny replaces the builder's allow for `standard`, and
	// `admin` now inherits it.
	for caller in [Caller::User("alice"), Caller::User("bob")] {
		let err = authz
			.authorize(&caller.context(), &request)
			.await
			.unwrap_err();
		assert!(matches!(err, AuthzError::PermissionDenied(_)), "{caller:?}");
	}
	assert_eq!(
		authz
			.determine_effect(&Action::new(VIEW), &[Role::new("admin")], Effect::Allow)
			.effect,
		Effect::Deny
	);
}

#[tokio::test]
async fn test_audit_enabled_setting_controls_publishing() {
	let request = AuthzRequest::new("document", VIEW).with_object_id("doc-1");

	for (enabled, expected) in [(false, 0), (true, 2)] {
		let file = config_file(&format!("[audit]\nenabled = {enabled}\n"));
		let config = load_config_with_file(file.path()).unwrap();
		assert_eq!(config.audit.enabled, enabled);

		let publisher = Arc::new(CountingPublisher::default());
		let authz = config
			.apply_with_audit(
				documents_builder(),
				vec![publisher.clone() as Arc<dyn AuditPublisher>],
			)
			.build()
			.unwrap();

		let _ = authz.authorize(&Caller::User("alice").context(), &request).await;
		let _ = authz.authorize(&Caller::Anonymous.context(), &request).await;

		sleep(Duration::from_millis(50)).await;
		assert_eq!(publisher.total(), expected, "enabled = {enabled}");
	}
}
