// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Where authorization configuration comes from, lowest precedence first.

use std::io::ErrorKind;
use std::path::PathBuf;

use tracing::{debug, trace};

use super::{AuditConfigLayer, AuthzConfigLayer, QueueOverflowPolicy};
use crate::error::ConfigError;

const SYSTEM_CONFIG_PATH: &str = "/etc/loom/authz.toml";

/// Merge order of the three layers. Later variants override earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults,
	File,
	Environment,
}

pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<AuthzConfigLayer, ConfigError>;
}

/// Contributes nothing; every default lives in `finalize`.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<AuthzConfigLayer, ConfigError> {
		Ok(AuthzConfigLayer::default())
	}
}

/// Policies, hierarchies and audit settings from a TOML file. A missing file
/// is an empty layer.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn system() -> Self {
		Self::new(SYSTEM_CONFIG_PATH)
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"authz-file"
	}

	fn precedence(&self) -> Precedence {
		Precedence::File
	}

	fn load(&self) -> Result<AuthzConfigLayer, ConfigError> {
		let content = match std::fs::read_to_string(&self.path) {
			Ok(content) => content,
			Err(e) if e.kind() == ErrorKind::NotFound => {
				debug!(path = %self.path.display(), "no authz config file");
				return Ok(AuthzConfigLayer::default());
			}
			Err(source) => {
				return Err(ConfigError::FileRead {
					path: self.path.clone(),
					source,
				})
			}
		};

		let layer: AuthzConfigLayer = toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
			path: self.path.clone(),
			source,
		})?;
		trace!(
			path = %self.path.display(),
			policies = layer.policies.as_ref().map_or(0, Vec::len),
			"parsed authz config file"
		);
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: LOOM_SERVER_AUTHZ_<SECTION>_<FIELD>. Policies and hierarchies
/// are file-only.
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<AuthzConfigLayer, ConfigError> {
		debug!("loading environment variables");
		Ok(AuthzConfigLayer {
			policies: None,
			role_hierarchies: None,
			audit: Some(load_audit_from_env()?),
		})
	}
}

fn env_var(name: &str) -> Option<String> {
	std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_bool(name: &str) -> Option<bool> {
	env_var(name).map(|v| v.eq_ignore_ascii_case("true") || v == "1")
}

fn env_usize(name: &str) -> Result<Option<usize>, ConfigError> {
	match env_var(name) {
		Some(v) => v.parse().map(Some).map_err(|_| ConfigError::InvalidValue {
			key: name.to_string(),
			message: format!("invalid usize value '{v}'"),
		}),
		None => Ok(None),
	}
}

fn env_overflow_policy(name: &str) -> Result<Option<QueueOverflowPolicy>, ConfigError> {
	env_var(name)
		.map(|v| {
			v.parse().map_err(|_| ConfigError::InvalidValue {
				key: name.to_string(),
				message: format!("expected drop_newest, drop_oldest or block, got '{v}'"),
			})
		})
		.transpose()
}

fn load_audit_from_env() -> Result<AuditConfigLayer, ConfigError> {
	Ok(AuditConfigLayer {
		enabled: env_bool("LOOM_SERVER_AUTHZ_AUDIT_ENABLED"),
		queue_capacity: env_usize("LOOM_SERVER_AUTHZ_AUDIT_QUEUE_CAPACITY")?,
		queue_overflow_policy: env_overflow_policy("LOOM_SERVER_AUTHZ_AUDIT_QUEUE_OVERFLOW_POLICY")?,
	})
}
