// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error model for authorization.
//!
//! Errors fall into four groups that callers must handle differently:
//!
//! - **Configuration**: a policy, fetcher or describer is missing. A setup bug.
//! - **Adapter**: a typed fetcher or describer received the wrong shape.
//! - **Upstream**: whatever a fetcher or describer returned, passed through untouched.
//! - **Denial**: the only expected negative outcome; carries a caller-safe message.

use std::path::PathBuf;

use http::StatusCode;
use loom_authz_core::{Action, DenialExplanation, HierarchyError, Scope};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AuthzError>;

/// A denial, with the explanation that may be shown to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Denial {
	explanation: DenialExplanation,
}

impl Denial {
	pub fn new(explanation: DenialExplanation) -> Self {
		Self { explanation }
	}

	pub fn explanation(&self) -> &DenialExplanation {
		&self.explanation
	}

	/// Text safe to return to the caller.
	pub fn user_message(&self) -> String {
		format!("Access denied: {}", self.explanation)
	}
}

#[derive(Debug, Error)]
pub enum AuthzError {
	#[error("authz error: no policies configured for '{action}' on {info}")]
	NoPolicy { action: Action, info: String },

	#[error("authz error: no object fetcher for key '{resource_key}' on {info}")]
	NoObjectFetcher { resource_key: String, info: String },

	#[error("authz error: no role describer for key '{resource_key}' on {info}")]
	NoRoleDescriber { resource_key: String, info: String },

	#[error("invalid role hierarchy: {0}")]
	Hierarchy(#[from] HierarchyError),

	#[error("invalid authorization config: {0}")]
	Config(#[from] ConfigError),

	#[error("authz: expected object type {expected}, got {actual}")]
	ObjectTypeMismatch {
		expected: &'static str,
		actual: &'static str,
	},

	#[error("authz: expected object id of kind {expected}, got {actual}")]
	KeyTypeMismatch {
		expected: &'static str,
		actual: &'static str,
	},

	#[error("authz: scope mismatch: expected {expected}, got {actual}")]
	ScopeMismatch { expected: String, actual: Scope },

	#[error("{0}")]
	NotFound(String),

	#[error(transparent)]
	Upstream(Box<dyn std::error::Error + Send + Sync>),

	#[error("you are not authorized to perform this action")]
	PermissionDenied(Denial),

	#[error("the requested action requires authentication")]
	Unauthenticated(Denial),

	#[error("authorization cancelled")]
	Cancelled,
}

/// Transport-neutral error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
	Internal,
	NotFound,
	PermissionDenied,
	Unauthenticated,
	Cancelled,
}

impl ErrorCode {
	pub fn status(self) -> StatusCode {
		match self {
			ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
			ErrorCode::NotFound => StatusCode::NOT_FOUND,
			ErrorCode::PermissionDenied => StatusCode::FORBIDDEN,
			ErrorCode::Unauthenticated => StatusCode::UNAUTHORIZED,
			ErrorCode::Cancelled => StatusCode::REQUEST_TIMEOUT,
		}
	}
}

impl AuthzError {
	/// Wraps an arbitrary fetcher or describer failure.
	pub fn upstream(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
		AuthzError::Upstream(err.into())
	}

	pub fn not_found(message: impl Into<String>) -> Self {
		AuthzError::NotFound(message.into())
	}

	pub fn code(&self) -> ErrorCode {
		match self {
			AuthzError::NotFound(_) => ErrorCode::NotFound,
			AuthzError::PermissionDenied(_) => ErrorCode::PermissionDenied,
			AuthzError::Unauthenticated(_) => ErrorCode::Unauthenticated,
			AuthzError::Cancelled => ErrorCode::Cancelled,
			_ => ErrorCode::Internal,
		}
	}

	pub fn status(&self) -> StatusCode {
		self.code().status()
	}

	pub fn is_denial(&self) -> bool {
		matches!(
			self,
			AuthzError::PermissionDenied(_) | AuthzError::Unauthenticated(_)
		)
	}

	pub fn is_configuration(&self) -> bool {
		matches!(
			self,
			AuthzError::NoPolicy { .. }
				| AuthzError::NoObjectFetcher { .. }
				| AuthzError::NoRoleDescriber { .. }
				| AuthzError::Hierarchy(_)
				| AuthzError::Config(_)
		)
	}

	pub fn denial(&self) -> Option<&Denial> {
		match self {
			AuthzError::PermissionDenied(d) | AuthzError::Unauthenticated(d) => Some(d),
			_ => None,
		}
	}

	/// Message that may be shown to the caller. Only denials have one.
	pub fn user_message(&self) -> Option<String> {
		self.denial().map(Denial::user_message)
	}
}

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("failed to read config file {path}: {source}")]
	FileRead {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to parse config file {path}: {source}")]
	TomlParse {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	#[error("invalid value for {key}: {message}")]
	InvalidValue { key: String, message: String },
}
