// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Type-erased object fetchers and role describers.
//!
//! These are what the registries store. Most integrations implement the typed
//! traits in [`crate::typed`] and let the adapters there do the type checks.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use loom_authz_core::{ObjectId, Role, Scope};

use crate::context::AuthzContext;
use crate::error::Result;
use crate::object::AuthzObject;

/// Resolves the object a request targets from its identifier.
#[async_trait]
pub trait ObjectFetcher: Send + Sync {
	async fn fetch_object(&self, ctx: &AuthzContext, id: &ObjectId) -> Result<AuthzObject>;
}

/// Computes the roles the caller in `ctx` holds on `object` within `scope`.
///
/// An anonymous caller is represented by `ctx.identity()` being `None`.
#[async_trait]
pub trait RoleDescriber: Send + Sync {
	async fn describe_roles(
		&self,
		ctx: &AuthzContext,
		object: &AuthzObject,
		scope: &Scope,
	) -> Result<Vec<Role>>;
}

#[async_trait]
impl<T: ObjectFetcher + ?Sized> ObjectFetcher for Arc<T> {
	async fn fetch_object(&self, ctx: &AuthzContext, id: &ObjectId) -> Result<AuthzObject> {
		(**self).fetch_object(ctx, id).await
	}
}

#[async_trait]
impl<T: RoleDescriber + ?Sized> RoleDescriber for Arc<T> {
	async fn describe_roles(
		&self,
		ctx: &AuthzContext,
		object: &AuthzObject,
		scope: &Scope,
	) -> Result<Vec<Role>> {
		(**self).describe_roles(ctx, object, scope).await
	}
}

/// An [`ObjectFetcher`] backed by an async closure over the raw identifier.
pub struct FnObjectFetcher<F> {
	f: F,
}

impl<F> FnObjectFetcher<F> {
	pub fn new<Fut>(f: F) -> Self
	where
		F: Fn(AuthzContext, ObjectId) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = Result<AuthzObject>> + Send + 'static,
	{
		Self { f }
	}
}

#[async_trait]
impl<F, Fut> ObjectFetcher for FnObjectFetcher<F>
where
	F: Fn(AuthzContext, ObjectId) -> Fut + Send + Sync + 'static,
	Fut: Future<Output = Result<AuthzObject>> + Send + 'static,
{
	async fn fetch_object(&self, ctx: &AuthzContext, id: &ObjectId) -> Result<AuthzObject> {
		(self.f)(ctx.clone(), id.clone()).await
	}
}

/// A [`RoleDescriber`] backed by an async closure over the erased object.
pub struct FnRoleDescriber<F> {
	f: F,
}

impl<F> FnRoleDescriber<F> {
	pub fn new<Fut>(f: F) -> Self
	where
		F: Fn(AuthzContext, AuthzObject, Scope) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = Result<Vec<Role>>> + Send + 'static,
	{
		Self { f }
	}
}

#[async_trait]
impl<F, Fut> RoleDescriber for FnRoleDescriber<F>
where
	F: Fn(AuthzContext, AuthzObject, Scope) -> Fut + Send + Sync + 'static,
	Fut: Future<Output = Result<Vec<Role>>> + Send + 'static,
{
	async fn describe_roles(
		&self,
		ctx: &AuthzContext,
		object: &AuthzObject,
		scope: &Scope,
	) -> Result<Vec<Role>> {
		(self.f)(ctx.clone(), object.clone(), scope.clone()).await
	}
}
