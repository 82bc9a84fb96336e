// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

use crate::error::{AuthzError, Result};

/// A fetched object, type-erased so fetchers and describers of different
/// resource types can share one registry.
///
/// The concrete type is checked once, when a typed describer receives it.
#[derive(Clone)]
pub struct AuthzObject {
	value: Arc<dyn Any + Send + Sync>,
	type_name: &'static str,
}

impl AuthzObject {
	pub fn new<T: Any + Send + Sync>(value: T) -> Self {
		Self::from_arc(Arc::new(value))
	}

	pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
		Self {
			value,
			type_name: type_name::<T>(),
		}
	}

	/// The placeholder object for resources that need no lookup.
	pub fn unit() -> Self {
		Self::new(())
	}

	pub fn type_name(&self) -> &'static str {
		self.type_name
	}

	pub fn is<T: Any>(&self) -> bool {
		self.value.is::<T>()
	}

	pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
		self.value.downcast_ref::<T>()
	}

	pub fn downcast_arc<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
		Arc::clone(&self.value).downcast::<T>().ok()
	}

	/// Like [`downcast_arc`](Self::downcast_arc), failing with
	/// [`AuthzError::ObjectTypeMismatch`].
	pub fn expect_type<T: Any + Send + Sync>(&self) -> Result<Arc<T>> {
		self.downcast_arc::<T>()
			.ok_or(AuthzError::ObjectTypeMismatch {
				expected: type_name::<T>(),
				actual: self.type_name,
			})
	}
}

impl fmt::Debug for AuthzObject {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("AuthzObject")
			.field("type", &self.type_name)
			.finish_non_exhaustive()
	}
}
