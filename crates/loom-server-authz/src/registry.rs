// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::collections::HashMap;

/// Resource key that matches any resource without a more specific entry.
pub const WILDCARD_KEY: &str = "*";

/// Entries keyed by resource key, with `"*"` as the fallback.
#[derive(Debug, Clone)]
pub struct Registry<V> {
	entries: HashMap<String, V>,
}

impl<V> Default for Registry<V> {
	fn default() -> Self {
		Self {
			entries: HashMap::new(),
		}
	}
}

impl<V> Registry<V> {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers `value` under `key`, returning any entry it replaced.
	pub fn insert(&mut self, key: impl Into<String>, value: V) -> Option<V> {
		self.entries.insert(key.into(), value)
	}

	/// Exact match first, then the wildcard entry.
	pub fn resolve(&self, key: &str) -> Option<&V> {
		self.entries
			.get(key)
			.or_else(|| self.entries.get(WILDCARD_KEY))
	}

	pub fn contains_exact(&self, key: &str) -> bool {
		self.entries.contains_key(key)
	}

	pub fn has_wildcard(&self) -> bool {
		self.entries.contains_key(WILDCARD_KEY)
	}

	/// Registered keys, sorted.
	pub fn keys(&self) -> Vec<&str> {
		let mut keys: Vec<&str> = self.entries.keys().map(String::as_str).collect();
		keys.sort_unstable();
		keys
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}
