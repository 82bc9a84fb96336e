// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Layered authorization configuration.
//!
//! Policies, role hierarchies and audit settings can be declared in TOML and
//! overridden from the environment:
//!
//! ```toml
//! role_hierarchies = [["owner", "admin", "editor", "viewer"]]
//!
//! [[policies]]
//! effect = "allow"
//! role = "editor"
//! action = "documents.write"
//!
//! [audit]
//! enabled = true
//! queue_capacity = 10000
//! queue_overflow_policy = "drop_newest"
//! ```
//!
//! A loaded [`AuthzConfig`] is applied to an [`AuthorizerBuilder`]; it never
//! produces an authorizer on its own.

mod sources;

pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use std::str::FromStr;
use std::sync::Arc;

use loom_authz_core::{Action, Effect, Role};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::audit::{AuditPublisher, QueuedAuditSink};
use crate::builder::AuthorizerBuilder;
use crate::error::ConfigError;

const DEFAULT_QUEUE_CAPACITY: usize = 10000;

fn default_queue_capacity() -> usize {
	DEFAULT_QUEUE_CAPACITY
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum QueueOverflowPolicy {
	#[default]
	DropNewest,
	DropOldest,
	Block,
}

impl FromStr for QueueOverflowPolicy {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"drop_newest" => Ok(Self::DropNewest),
			"drop_oldest" => Ok(Self::DropOldest),
			"block" => Ok(Self::Block),
			other => Err(format!("unknown queue overflow policy '{other}'")),
		}
	}
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AuditConfigLayer {
	pub enabled: Option<bool>,
	pub queue_capacity: Option<usize>,
	pub queue_overflow_policy: Option<QueueOverflowPolicy>,
}

impl AuditConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.enabled.is_some() {
			self.enabled = other.enabled;
		}
		if other.queue_capacity.is_some() {
			self.queue_capacity = other.queue_capacity;
		}
		if other.queue_overflow_policy.is_some() {
			self.queue_overflow_policy = other.queue_overflow_policy;
		}
	}

	pub fn finalize(self) -> AuditConfig {
		AuditConfig {
			enabled: self.enabled.unwrap_or(true),
			queue_capacity: self.queue_capacity.unwrap_or_else(default_queue_capacity),
			queue_overflow_policy: self.queue_overflow_policy.unwrap_or_default(),
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditConfig {
	pub enabled: bool,
	pub queue_capacity: usize,
	pub queue_overflow_policy: QueueOverflowPolicy,
}

impl Default for AuditConfig {
	fn default() -> Self {
		Self {
			enabled: true,
			queue_capacity: default_queue_capacity(),
			queue_overflow_policy: QueueOverflowPolicy::default(),
		}
	}
}

/// One `[[policies]]` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PolicyConfig {
	pub effect: Effect,
	pub role: String,
	pub action: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AuthzConfigLayer {
	pub policies: Option<Vec<PolicyConfig>>,
	pub role_hierarchies: Option<Vec<Vec<String>>>,
	pub audit: Option<AuditConfigLayer>,
}

impl AuthzConfigLayer {
	/// Policies and hierarchies accumulate across layers; audit scalars override.
	pub fn merge(&mut self, other: Self) {
		if let Some(policies) = other.policies {
			self.policies.get_or_insert_with(Vec::new).extend(policies);
		}
		if let Some(chains) = other.role_hierarchies {
			self.role_hierarchies.get_or_insert_with(Vec::new).extend(chains);
		}
		if let Some(audit) = other.audit {
			match self.audit.as_mut() {
				Some(existing) => existing.merge(audit),
				None => self.audit = Some(audit),
			}
		}
	}

	pub fn finalize(self) -> Result<AuthzConfig, ConfigError> {
		let policies = self.policies.unwrap_or_default();
		for (i, policy) in policies.iter().enumerate() {
			if policy.role.is_empty() {
				return Err(ConfigError::InvalidValue {
					key: format!("policies[{i}].role"),
					message: "role must not be empty".to_string(),
				});
			}
			if policy.action.is_empty() {
				return Err(ConfigError::InvalidValue {
					key: format!("policies[{i}].action"),
					message: "action must not be empty".to_string(),
				});
			}
		}

		let config = AuthzConfig {
			policies,
			role_hierarchies: self.role_hierarchies.unwrap_or_default(),
			audit: self.audit.unwrap_or_default().finalize(),
		};

		info!(
			policies = config.policies.len(),
			role_hierarchies = config.role_hierarchies.len(),
			audit_enabled = config.audit.enabled,
			"authorization configuration loaded"
		);

		Ok(config)
	}
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthzConfig {
	pub policies: Vec<PolicyConfig>,
	pub role_hierarchies: Vec<Vec<String>>,
	pub audit: AuditConfig,
}

impl AuthzConfig {
	/// Declares every configured policy and hierarchy chain on `builder`.
	/// Hierarchy errors surface from [`AuthorizerBuilder::build`].
	pub fn apply(&self, builder: AuthorizerBuilder) -> AuthorizerBuilder {
		let builder = self.policies.iter().fold(builder, |b, p| {
			b.policy(
				p.effect,
				Role::new(p.role.as_str()),
				Action::new(p.action.as_str()),
			)
		});
		self.role_hierarchies
			.iter()
			.fold(builder, |b, chain| b.role_hierarchy(chain.iter().map(String::as_str)))
	}

	/// Like [`apply`](Self::apply), and also attaches a [`QueuedAuditSink`]
	/// feeding `publishers` unless `audit.enabled` is false.
	///
	/// Must be called inside a Tokio runtime.
	pub fn apply_with_audit(
		&self,
		builder: AuthorizerBuilder,
		publishers: Vec<Arc<dyn AuditPublisher>>,
	) -> AuthorizerBuilder {
		let builder = self.apply(builder);
		match QueuedAuditSink::from_config(&self.audit, publishers) {
			Some(sink) => builder.audit_sink(sink),
			None => builder,
		}
	}
}

fn load_from(sources: Vec<Box<dyn ConfigSource>>) -> Result<AuthzConfig, ConfigError> {
	let mut sources = sources;
	sources.sort_by_key(|s| s.precedence());

	let mut merged = AuthzConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	merged.finalize()
}

/// Defaults, then `/etc/loom/authz.toml`, then the environment.
pub fn load_config() -> Result<AuthzConfig, ConfigError> {
	load_from(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<AuthzConfig, ConfigError> {
	load_from(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

/// Load configuration from environment only.
pub fn load_config_from_env() -> Result<AuthzConfig, ConfigError> {
	load_from(vec![Box::new(DefaultsSource), Box::new(EnvSource)])
}
