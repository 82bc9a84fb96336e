// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Reusable [`TypedObjectFetcher`] building blocks.

use std::collections::HashMap;
use std::fmt::Display;
use std::future::Future;
use std::hash::Hash;
use std::marker::PhantomData;

use async_trait::async_trait;

use crate::context::AuthzContext;
use crate::error::{AuthzError, Result};
use crate::typed::TypedObjectFetcher;

/// Fetcher backed by an async closure.
pub struct FnFetcher<F, K, T> {
	f: F,
	_marker: PhantomData<fn(K) -> T>,
}

pub fn fetcher<K, T, F, Fut>(f: F) -> FnFetcher<F, K, T>
where
	K: Send + 'static,
	T: Send + 'static,
	F: Fn(AuthzContext, K) -> Fut + Send + Sync + 'static,
	Fut: Future<Output = Result<T>> + Send + 'static,
{
	FnFetcher {
		f,
		_marker: PhantomData,
	}
}

#[async_trait]
impl<K, T, F, Fut> TypedObjectFetcher<K, T> for FnFetcher<F, K, T>
where
	K: Send + 'static,
	T: Send + 'static,
	F: Fn(AuthzContext, K) -> Fut + Send + Sync + 'static,
	Fut: Future<Output = Result<T>> + Send + 'static,
{
	async fn fetch(&self, ctx: &AuthzContext, key: K) -> Result<T> {
		(self.f)(ctx.clone(), key).await
	}
}

/// In-memory fetcher. Unknown keys fail with [`AuthzError::NotFound`].
pub struct MapFetcher<K, T> {
	objects: HashMap<K, T>,
}

pub fn map_fetcher<K, T>(objects: HashMap<K, T>) -> MapFetcher<K, T> {
	MapFetcher { objects }
}

#[async_trait]
impl<K, T> TypedObjectFetcher<K, T> for MapFetcher<K, T>
where
	K: Eq + Hash + Display + Send + Sync + 'static,
	T: Clone + Send + Sync + 'static,
{
	async fn fetch(&self, _ctx: &AuthzContext, key: K) -> Result<T> {
		self.objects
			.get(&key)
			.cloned()
			.ok_or_else(|| AuthzError::not_found(format!("object not found for key: {key}")))
	}
}

/// Runs `validate` on every fetched object; its error replaces the object.
pub struct ValidatedFetcher<F, V> {
	inner: F,
	validate: V,
}

pub fn validated_fetcher<F, V>(inner: F, validate: V) -> ValidatedFetcher<F, V> {
	ValidatedFetcher { inner, validate }
}

#[async_trait]
impl<K, T, F, V> TypedObjectFetcher<K, T> for ValidatedFetcher<F, V>
where
	K: Send + 'static,
	T: Send + 'static,
	F: TypedObjectFetcher<K, T>,
	V: Fn(&T) -> Result<()> + Send + Sync,
{
	async fn fetch(&self, ctx: &AuthzContext, key: K) -> Result<T> {
		let object = self.inner.fetch(ctx, key).await?;
		(self.validate)(&object)?;
		Ok(object)
	}
}

/// Tries each fetcher in order and returns the first success, or the last error.
pub struct ComposeFetchers<K, T> {
	fetchers: Vec<Box<dyn TypedObjectFetcher<K, T>>>,
}

pub fn compose_fetchers<K, T>(fetchers: Vec<Box<dyn TypedObjectFetcher<K, T>>>) -> ComposeFetchers<K, T>
where
	K: Send + 'static,
	T: Send + 'static,
{
	ComposeFetchers { fetchers }
}

#[async_trait]
impl<K, T> TypedObjectFetcher<K, T> for ComposeFetchers<K, T>
where
	K: Clone + Send + Sync + 'static,
	T: Send + 'static,
{
	async fn fetch(&self, ctx: &AuthzContext, key: K) -> Result<T> {
		let mut last_err = None;
		for fetcher in &self.fetchers {
			match fetcher.fetch(ctx, key.clone()).await {
				Ok(object) => return Ok(object),
				Err(e) => last_err = Some(e),
			}
		}
		Err(last_err.unwrap_or_else(|| AuthzError::not_found("no object fetchers composed")))
	}
}

/// Maps the incoming key before delegating to a fetcher keyed differently.
pub struct TransformKey<Tr, F, K2> {
	transform: Tr,
	inner: F,
	_marker: PhantomData<fn() -> K2>,
}

pub fn transform_key<K1, K2, T, Tr, F>(transform: Tr, inner: F) -> TransformKey<Tr, F, K2>
where
	Tr: Fn(K1) -> K2 + Send + Sync,
	F: TypedObjectFetcher<K2, T>,
	K2: Send + 'static,
	T: Send + 'static,
{
	TransformKey {
		transform,
		inner,
		_marker: PhantomData,
	}
}

#[async_trait]
impl<K1, K2, T, Tr, F> TypedObjectFetcher<K1, T> for TransformKey<Tr, F, K2>
where
	K1: Send + 'static,
	K2: Send + 'static,
	T: Send + 'static,
	Tr: Fn(K1) -> K2 + Send + Sync,
	F: TypedObjectFetcher<K2, T>,
{
	async fn fetch(&self, ctx: &AuthzContext, key: K1) -> Result<T> {
		let key = (self.transform)(key);
		self.inner.fetch(ctx, key).await
	}
}

/// Returns `default` whenever the inner fetcher fails.
pub struct DefaultFetcher<F, T> {
	inner: F,
	default: T,
}

pub fn default_fetcher<F, T>(inner: F, default: T) -> DefaultFetcher<F, T> {
	DefaultFetcher { inner, default }
}

#[async_trait]
impl<K, T, F> TypedObjectFetcher<K, T> for DefaultFetcher<F, T>
where
	K: Send + 'static,
	T: Clone + Send + Sync + 'static,
	F: TypedObjectFetcher<K, T>,
{
	async fn fetch(&self, ctx: &AuthzContext, key: K) -> Result<T> {
		match self.inner.fetch(ctx, key).await {
			Ok(object) => Ok(object),
			Err(_) => Ok(self.default.clone()),
		}
	}
}
