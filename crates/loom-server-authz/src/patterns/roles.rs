// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Reusable [`TypedRoleDescriber`] building blocks.
//!
//! A resource usually combines several of these with [`compose`]:
//!
//! ```ignore
//! let describer = compose(vec![
//!     Box::new(ownership_role(OWNER, |d: &Document| d.author_id.clone())),
//!     Box::new(global_role(ADMIN, |ctx: &AuthzContext| is_staff(ctx))),
//! ]);
//! ```
//!
//! Describers that depend on the caller return no roles for anonymous requests
//! rather than failing, so the authorizer can report `Unauthenticated`.

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use loom_authz_core::{Role, Scope};

use crate::context::AuthzContext;
use crate::error::{AuthzError, Result};
use crate::typed::TypedRoleDescriber;

/// Objects that belong to exactly one scope.
pub trait ScopedObject {
	fn scope_id(&self) -> &str;
}

// =============================================================================
// Closures
// =============================================================================

/// Describer backed by an async closure.
pub struct FnDescriber<F, T> {
	f: F,
	_marker: PhantomData<fn(T)>,
}

pub fn describer<T, F, Fut>(f: F) -> FnDescriber<F, T>
where
	T: Send + Sync + 'static,
	F: Fn(AuthzContext, Arc<T>, Scope) -> Fut + Send + Sync + 'static,
	Fut: Future<Output = Result<Vec<Role>>> + Send + 'static,
{
	FnDescriber {
		f,
		_marker: PhantomData,
	}
}

#[async_trait]
impl<T, F, Fut> TypedRoleDescriber<T> for FnDescriber<F, T>
where
	T: Send + Sync + 'static,
	F: Fn(AuthzContext, Arc<T>, Scope) -> Fut + Send + Sync + 'static,
	Fut: Future<Output = Result<Vec<Role>>> + Send + 'static,
{
	async fn describe(&self, ctx: &AuthzContext, object: Arc<T>, scope: &Scope) -> Result<Vec<Role>> {
		(self.f)(ctx.clone(), object, scope.clone()).await
	}
}

// =============================================================================
// Composition
// =============================================================================

/// Concatenates the roles of every describer. The first error aborts.
pub struct Compose<T> {
	describers: Vec<Box<dyn TypedRoleDescriber<T>>>,
}

pub fn compose<T>(describers: Vec<Box<dyn TypedRoleDescriber<T>>>) -> Compose<T>
where
	T: Send + Sync + 'static,
{
	Compose { describers }
}

#[async_trait]
impl<T> TypedRoleDescriber<T> for Compose<T>
where
	T: Send + Sync + 'static,
{
	async fn describe(&self, ctx: &AuthzContext, object: Arc<T>, scope: &Scope) -> Result<Vec<Role>> {
		let mut roles = Vec::new();
		for describer in &self.describers {
			roles.extend(describer.describe(ctx, Arc::clone(&object), scope).await?);
		}
		Ok(roles)
	}
}

/// [`compose`] for scoped objects: an object outside the request scope yields no roles.
pub fn compose_scoped<T>(describers: Vec<Box<dyn TypedRoleDescriber<T>>>) -> ValidateScope<Compose<T>>
where
	T: ScopedObject + Send + Sync + 'static,
{
	validate_scope(compose(describers))
}

/// Returns no roles when the object's scope differs from the request scope.
pub struct ValidateScope<D> {
	inner: D,
}

pub fn validate_scope<D>(inner: D) -> ValidateScope<D> {
	ValidateScope { inner }
}

#[async_trait]
impl<T, D> TypedRoleDescriber<T> for ValidateScope<D>
where
	T: ScopedObject + Send + Sync + 'static,
	D: TypedRoleDescriber<T>,
{
	async fn describe(&self, ctx: &AuthzContext, object: Arc<T>, scope: &Scope) -> Result<Vec<Role>> {
		if object.scope_id() != scope.as_str() {
			return Ok(Vec::new());
		}
		self.inner.describe(ctx, object, scope).await
	}
}

// =============================================================================
// Predicates
// =============================================================================

/// Grants `role` when an async predicate holds.
pub struct ConditionalRole<P, T> {
	role: Role,
	predicate: P,
	_marker: PhantomData<fn(T)>,
}

pub fn conditional_role<T, P, Fut>(role: impl Into<Role>, predicate: P) -> ConditionalRole<P, T>
where
	T: Send + Sync + 'static,
	P: Fn(AuthzContext, Arc<T>, Scope) -> Fut + Send + Sync + 'static,
	Fut: Future<Output = Result<bool>> + Send + 'static,
{
	ConditionalRole {
		role: role.into(),
		predicate,
		_marker: PhantomData,
	}
}

#[async_trait]
impl<T, P, Fut> TypedRoleDescriber<T> for ConditionalRole<P, T>
where
	T: Send + Sync + 'static,
	P: Fn(AuthzContext, Arc<T>, Scope) -> Fut + Send + Sync + 'static,
	Fut: Future<Output = Result<bool>> + Send + 'static,
{
	async fn describe(&self, ctx: &AuthzContext, object: Arc<T>, scope: &Scope) -> Result<Vec<Role>> {
		if (self.predicate)(ctx.clone(), object, scope.clone()).await? {
			Ok(vec![self.role.clone()])
		} else {
			Ok(Vec::new())
		}
	}
}

/// Grants `role` when a synchronous predicate over the caller and object holds.
pub struct StaticRole<P, T> {
	role: Role,
	predicate: P,
	_marker: PhantomData<fn(T)>,
}

pub fn static_role<T, P>(role: impl Into<Role>, predicate: P) -> StaticRole<P, T>
where
	T: Send + Sync + 'static,
	P: Fn(&AuthzContext, &T) -> bool + Send + Sync + 'static,
{
	StaticRole {
		role: role.into(),
		predicate,
		_marker: PhantomData,
	}
}

#[async_trait]
impl<T, P> TypedRoleDescriber<T> for StaticRole<P, T>
where
	T: Send + Sync + 'static,
	P: Fn(&AuthzContext, &T) -> bool + Send + Sync + 'static,
{
	async fn describe(&self, ctx: &AuthzContext, object: Arc<T>, _scope: &Scope) -> Result<Vec<Role>> {
		if (self.predicate)(ctx, &*object) {
			Ok(vec![self.role.clone()])
		} else {
			Ok(Vec::new())
		}
	}
}

/// Roles computed synchronously from the caller and object.
pub struct StaticRoles<F, T> {
	roles: F,
	_marker: PhantomData<fn(T)>,
}

pub fn static_roles<T, F>(roles: F) -> StaticRoles<F, T>
where
	T: Send + Sync + 'static,
	F: Fn(&AuthzContext, &T) -> Vec<Role> + Send + Sync + 'static,
{
	StaticRoles {
		roles,
		_marker: PhantomData,
	}
}

#[async_trait]
impl<T, F> TypedRoleDescriber<T> for StaticRoles<F, T>
where
	T: Send + Sync + 'static,
	F: Fn(&AuthzContext, &T) -> Vec<Role> + Send + Sync + 'static,
{
	async fn describe(&self, ctx: &AuthzContext, object: Arc<T>, _scope: &Scope) -> Result<Vec<Role>> {
		Ok((self.roles)(ctx, &*object))
	}
}

/// Grants `role` based on the request alone, whatever the object.
pub struct GlobalRole<P> {
	role: Role,
	predicate: P,
}

pub fn global_role<P>(role: impl Into<Role>, predicate: P) -> GlobalRole<P>
where
	P: Fn(&AuthzContext) -> bool + Send + Sync + 'static,
{
	GlobalRole {
		role: role.into(),
		predicate,
	}
}

#[async_trait]
impl<T, P> TypedRoleDescriber<T> for GlobalRole<P>
where
	T: Send + Sync + 'static,
	P: Fn(&AuthzContext) -> bool + Send + Sync + 'static,
{
	async fn describe(&self, ctx: &AuthzContext, _object: Arc<T>, _scope: &Scope) -> Result<Vec<Role>> {
		if (self.predicate)(ctx) {
			Ok(vec![self.role.clone()])
		} else {
			Ok(Vec::new())
		}
	}
}

// =============================================================================
// Ownership and membership
// =============================================================================

/// Grants `role` when the object's owner is the caller's subject.
pub struct OwnershipRole<O, T> {
	role: Role,
	owner_id: O,
	_marker: PhantomData<fn(T)>,
}

pub fn ownership_role<T, O>(role: impl Into<Role>, owner_id: O) -> OwnershipRole<O, T>
where
	T: Send + Sync + 'static,
	O: Fn(&T) -> String + Send + Sync + 'static,
{
	OwnershipRole {
		role: role.into(),
		owner_id,
		_marker: PhantomData,
	}
}

#[async_trait]
impl<T, O> TypedRoleDescriber<T> for OwnershipRole<O, T>
where
	T: Send + Sync + 'static,
	O: Fn(&T) -> String + Send + Sync + 'static,
{
	async fn describe(&self, ctx: &AuthzContext, object: Arc<T>, _scope: &Scope) -> Result<Vec<Role>> {
		match ctx.identity() {
			Some(identity) if (self.owner_id)(&*object) == identity.subject => {
				Ok(vec![self.role.clone()])
			}
			_ => Ok(Vec::new()),
		}
	}
}

/// Like [`ownership_role`], but the caller's user ID is resolved asynchronously
/// (for example by looking up a local account for the identity).
///
/// A `NotFound` from the resolver means the caller has no account: no roles.
pub struct IdentityOwnershipRole<R, O, T> {
	role: Role,
	resolve_user_id: R,
	owner_id: O,
	_marker: PhantomData<fn(T)>,
}

pub fn identity_ownership_role<T, R, Fut, O>(
	role: impl Into<Role>,
	resolve_user_id: R,
	owner_id: O,
) -> IdentityOwnershipRole<R, O, T>
where
	T: Send + Sync + 'static,
	R: Fn(AuthzContext, Arc<T>) -> Fut + Send + Sync + 'static,
	Fut: Future<Output = Result<String>> + Send + 'static,
	O: Fn(&T) -> String + Send + Sync + 'static,
{
	IdentityOwnershipRole {
		role: role.into(),
		resolve_user_id,
		owner_id,
		_marker: PhantomData,
	}
}

#[async_trait]
impl<T, R, Fut, O> TypedRoleDescriber<T> for IdentityOwnershipRole<R, O, T>
where
	T: Send + Sync + 'static,
	R: Fn(AuthzContext, Arc<T>) -> Fut + Send + Sync + 'static,
	Fut: Future<Output = Result<String>> + Send + 'static,
	O: Fn(&T) -> String + Send + Sync + 'static,
{
	async fn describe(&self, ctx: &AuthzContext, object: Arc<T>, _scope: &Scope) -> Result<Vec<Role>> {
		if !ctx.is_authenticated() {
			return Ok(Vec::new());
		}

		let user_id = match (self.resolve_user_id)(ctx.clone(), Arc::clone(&object)).await {
			Ok(id) => id,
			Err(AuthzError::NotFound(_)) => return Ok(Vec::new()),
			Err(e) => return Err(e),
		};

		if user_id == (self.owner_id)(&*object) {
			Ok(vec![self.role.clone()])
		} else {
			Ok(Vec::new())
		}
	}
}

/// Roles the caller holds in the object's parent (for example its workspace).
pub struct MembershipRoles<P, G, T> {
	parent_id: P,
	roles_in: G,
	_marker: PhantomData<fn(T)>,
}

pub fn membership_roles<T, P, G, Fut>(parent_id: P, roles_in: G) -> MembershipRoles<P, G, T>
where
	T: Send + Sync + 'static,
	P: Fn(&T) -> String + Send + Sync + 'static,
	G: Fn(AuthzContext, String) -> Fut + Send + Sync + 'static,
	Fut: Future<Output = Result<Vec<Role>>> + Send + 'static,
{
	MembershipRoles {
		parent_id,
		roles_in,
		_marker: PhantomData,
	}
}

#[async_trait]
impl<T, P, G, Fut> TypedRoleDescriber<T> for MembershipRoles<P, G, T>
where
	T: Send + Sync + 'static,
	P: Fn(&T) -> String + Send + Sync + 'static,
	G: Fn(AuthzContext, String) -> Fut + Send + Sync + 'static,
	Fut: Future<Output = Result<Vec<Role>>> + Send + 'static,
{
	async fn describe(&self, ctx: &AuthzContext, object: Arc<T>, _scope: &Scope) -> Result<Vec<Role>> {
		if !ctx.is_authenticated() {
			return Ok(Vec::new());
		}
		let parent_id = (self.parent_id)(&*object);
		(self.roles_in)(ctx.clone(), parent_id).await
	}
}

/// Roles the caller holds in the object's scope.
///
/// Unlike [`validate_scope`], a request for the wrong scope is an error.
pub struct ScopeRoles<S, G, T> {
	scope_id: S,
	roles_in: G,
	_marker: PhantomData<fn(T)>,
}

pub fn scope_roles<T, S, G, Fut>(scope_id: S, roles_in: G) -> ScopeRoles<S, G, T>
where
	T: Send + Sync + 'static,
	S: Fn(&T) -> String + Send + Sync + 'static,
	G: Fn(AuthzContext, String) -> Fut + Send + Sync + 'static,
	Fut: Future<Output = Result<Vec<Role>>> + Send + 'static,
{
	ScopeRoles {
		scope_id,
		roles_in,
		_marker: PhantomData,
	}
}

#[async_trait]
impl<T, S, G, Fut> TypedRoleDescriber<T> for ScopeRoles<S, G, T>
where
	T: Send + Sync + 'static,
	S: Fn(&T) -> String + Send + Sync + 'static,
	G: Fn(AuthzContext, String) -> Fut + Send + Sync + 'static,
	Fut: Future<Output = Result<Vec<Role>>> + Send + 'static,
{
	async fn describe(&self, ctx: &AuthzContext, object: Arc<T>, scope: &Scope) -> Result<Vec<Role>> {
		if !ctx.is_authenticated() {
			return Ok(Vec::new());
		}
		let scope_id = (self.scope_id)(&*object);
		if scope.as_str() != scope_id {
			return Err(AuthzError::ScopeMismatch {
				expected: scope_id,
				actual: scope.clone(),
			});
		}
		(self.roles_in)(ctx.clone(), scope_id).await
	}
}
