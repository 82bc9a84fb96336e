// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Typed fetchers and describers, and the adapters that erase them.
//!
//! The adapters are the only place an [`ObjectId`] is converted into a key
//! type or an [`AuthzObject`] is downcast. A mismatch becomes
//! [`AuthzError::KeyTypeMismatch`] or [`AuthzError::ObjectTypeMismatch`].

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use loom_authz_core::{ObjectId, Role, Scope};
use uuid::Uuid;

use crate::context::AuthzContext;
use crate::error::{AuthzError, Result};
use crate::object::AuthzObject;
use crate::resolver::{ObjectFetcher, RoleDescriber};

// =============================================================================
// Key conversion
// =============================================================================

/// Key types a typed fetcher can be keyed by.
pub trait FromObjectId: Sized + Send + 'static {
	/// Kind reported in mismatch errors.
	const KIND: &'static str;

	fn from_object_id(id: &ObjectId) -> Option<Self>;
}

impl FromObjectId for String {
	const KIND: &'static str = "string";

	fn from_object_id(id: &ObjectId) -> Option<Self> {
		match id {
			ObjectId::String(s) => Some(s.clone()),
			_ => None,
		}
	}
}

impl FromObjectId for i64 {
	const KIND: &'static str = "int";

	fn from_object_id(id: &ObjectId) -> Option<Self> {
		match id {
			ObjectId::Int(n) => Some(*n),
			_ => None,
		}
	}
}

/// Accepts a UUID, or a string that parses as one.
impl FromObjectId for Uuid {
	const KIND: &'static str = "uuid";

	fn from_object_id(id: &ObjectId) -> Option<Self> {
		match id {
			ObjectId::Uuid(u) => Some(*u),
			ObjectId::String(s) => Uuid::parse_str(s).ok(),
			_ => None,
		}
	}
}

/// For resources that need no identifier; any id is accepted and ignored.
impl FromObjectId for () {
	const KIND: &'static str = "none";

	fn from_object_id(_id: &ObjectId) -> Option<Self> {
		Some(())
	}
}

impl FromObjectId for ObjectId {
	const KIND: &'static str = "any";

	fn from_object_id(id: &ObjectId) -> Option<Self> {
		Some(id.clone())
	}
}

// =============================================================================
// Typed traits
// =============================================================================

/// Fetches an object of type `T` by key `K`.
#[async_trait]
pub trait TypedObjectFetcher<K, T>: Send + Sync
where
	K: Send + 'static,
	T: Send + 'static,
{
	async fn fetch(&self, ctx: &AuthzContext, key: K) -> Result<T>;
}

/// Describes the caller's roles on an object of type `T`.
#[async_trait]
pub trait TypedRoleDescriber<T>: Send + Sync
where
	T: Send + Sync + 'static,
{
	async fn describe(&self, ctx: &AuthzContext, object: Arc<T>, scope: &Scope) -> Result<Vec<Role>>;
}

#[async_trait]
impl<K, T, F> TypedObjectFetcher<K, T> for Box<F>
where
	K: Send + 'static,
	T: Send + 'static,
	F: TypedObjectFetcher<K, T> + ?Sized,
{
	async fn fetch(&self, ctx: &AuthzContext, key: K) -> Result<T> {
		(**self).fetch(ctx, key).await
	}
}

#[async_trait]
impl<K, T, F> TypedObjectFetcher<K, T> for Arc<F>
where
	K: Send + 'static,
	T: Send + 'static,
	F: TypedObjectFetcher<K, T> + ?Sized,
{
	async fn fetch(&self, ctx: &AuthzContext, key: K) -> Result<T> {
		(**self).fetch(ctx, key).await
	}
}

#[async_trait]
impl<T, D> TypedRoleDescriber<T> for Box<D>
where
	T: Send + Sync + 'static,
	D: TypedRoleDescriber<T> + ?Sized,
{
	async fn describe(&self, ctx: &AuthzContext, object: Arc<T>, scope: &Scope) -> Result<Vec<Role>> {
		(**self).describe(ctx, object, scope).await
	}
}

#[async_trait]
impl<T, D> TypedRoleDescriber<T> for Arc<D>
where
	T: Send + Sync + 'static,
	D: TypedRoleDescriber<T> + ?Sized,
{
	async fn describe(&self, ctx: &AuthzContext, object: Arc<T>, scope: &Scope) -> Result<Vec<Role>> {
		(**self).describe(ctx, object, scope).await
	}
}

// =============================================================================
// Erasing adapters
// =============================================================================

/// Exposes a [`TypedObjectFetcher`] as an [`ObjectFetcher`].
pub struct AsObjectFetcher<F, K, T> {
	inner: F,
	_marker: PhantomData<fn(K) -> T>,
}

impl<F, K, T> AsObjectFetcher<F, K, T>
where
	F: TypedObjectFetcher<K, T>,
	K: FromObjectId,
	T: Send + Sync + 'static,
{
	pub fn new(inner: F) -> Self {
		Self {
			inner,
			_marker: PhantomData,
		}
	}
}

#[async_trait]
impl<F, K, T> ObjectFetcher for AsObjectFetcher<F, K, T>
where
	F: TypedObjectFetcher<K, T>,
	K: FromObjectId,
	T: Send + Sync + 'static,
{
	async fn fetch_object(&self, ctx: &AuthzContext, id: &ObjectId) -> Result<AuthzObject> {
		let key = K::from_object_id(id).ok_or(AuthzError::KeyTypeMismatch {
			expected: K::KIND,
			actual: id.kind(),
		})?;
		let object = self.inner.fetch(ctx, key).await?;
		Ok(AuthzObject::new(object))
	}
}

/// Exposes a [`TypedRoleDescriber`] as a [`RoleDescriber`].
pub struct AsRoleDescriber<D, T> {
	inner: D,
	_marker: PhantomData<fn(T)>,
}

impl<D, T> AsRoleDescriber<D, T>
where
	D: TypedRoleDescriber<T>,
	T: Send + Sync + 'static,
{
	pub fn new(inner: D) -> Self {
		Self {
			inner,
			_marker: PhantomData,
		}
	}
}

#[async_trait]
impl<D, T> RoleDescriber for AsRoleDescriber<D, T>
where
	D: TypedRoleDescriber<T>,
	T: Send + Sync + 'static,
{
	async fn describe_roles(
		&self,
		ctx: &AuthzContext,
		object: &AuthzObject,
		scope: &Scope,
	) -> Result<Vec<Role>> {
		let typed = object.expect_type::<T>()?;
		self.inner.describe(ctx, typed, scope).await
	}
}
