// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Role-based authorization engine for Loom server.
//!
//! An [`Authorizer`] answers one question per request: may the caller perform
//! this action on this object? It
//!
//! 1. checks that the action has policies at all,
//! 2. fetches the object through the [`ObjectFetcher`] registered for the
//!    resource key (or the `"*"` fallback),
//! 3. asks the matching [`RoleDescriber`] which roles the caller holds on it,
//! 4. expands those roles through the role hierarchy and resolves the effect
//!    with explicit deny taking precedence,
//! 5. hands the [`AuthzDecision`] to every [`AuditSink`].
//!
//! # Example
//!
//! ```ignore
//! use loom_server_authz::{Authorizer, AuthzContext, AuthzRequest, Effect};
//! use loom_server_authz::patterns::ownership_role;
//!
//! let authz = Authorizer::builder()
//!     .role_hierarchy(["owner", "editor"])
//!     .policy(Effect::Allow, "editor", "documents.update")
//!     .typed_object_fetcher::<String, Document, _>("document", DocumentStore::new(pool))
//!     .typed_role_describer::<Document, _>("document", ownership_role("owner", |d: &Document| d.author_id.clone()))
//!     .audit_sink(TracingAuditSink)
//!     .build()?;
//!
//! let request = AuthzRequest::new("document", "documents.update").with_object_id(doc_id);
//! authz.authorize(&AuthzContext::authenticated(identity), &request).await?;
//! ```

pub mod audit;
pub mod authorizer;
pub mod builder;
pub mod common;
pub mod config;
pub mod context;
mod debug;
pub mod endpoint;
pub mod error;
pub mod object;
pub mod patterns;
pub mod registry;
pub mod resolver;
pub mod typed;

pub use audit::{AuditSink, FnAuditSink, QueuedAuditSink, TracingAuditSink};
pub use authorizer::{Authorizer, AuthzRequest};
pub use builder::AuthorizerBuilder;
pub use config::{load_config, load_config_with_file, AuthzConfig, QueueOverflowPolicy};
pub use context::AuthzContext;
pub use endpoint::EndpointSpec;
pub use error::{AuthzError, ConfigError, Denial, ErrorCode, Result};
pub use object::AuthzObject;
pub use registry::WILDCARD_KEY;
pub use resolver::{FnObjectFetcher, FnRoleDescriber, ObjectFetcher, RoleDescriber};
pub use typed::{AsObjectFetcher, AsRoleDescriber, FromObjectId, TypedObjectFetcher, TypedRoleDescriber};

pub use loom_authz_core::{
	Action, AuthzDecision, DecisionReason, DenialExplanation, Effect, EffectResolution, HierarchyError,
	Identity, ObjectId, Policy, PolicyEvaluation, Role, Scope,
};
