// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Identifier types for role-based authorization.
//!
//! - **Name newtypes**: [`Role`], [`Action`] and [`Scope`] wrap application-defined
//!   strings so they cannot be mixed up at call sites
//! - [`ObjectId`]: the opaque identifier a transport extracts from a request
//! - [`Identity`]: the already-verified caller supplied by the authentication layer
//!
//! All name types serialize transparently as strings and can be declared as
//! `const` items via `from_static`.

use serde::{Deserialize, Serialize};
use std::borrow::{Borrow, Cow};
use std::fmt;
use uuid::Uuid;

// =============================================================================
// Name Newtypes
// =============================================================================

macro_rules! define_name_type {
	($name:ident, $doc:expr) => {
		#[doc = $doc]
		#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
		#[serde(transparent)]
		pub struct $name(Cow<'static, str>);

		impl $name {
			/// Create a new name from any string.
			pub fn new(name: impl Into<String>) -> Self {
				Self(Cow::Owned(name.into()))
			}

			/// Create a name from a string literal, usable in `const` items.
			pub const fn from_static(name: &'static str) -> Self {
				Self(Cow::Borrowed(name))
			}

			/// Get the name as a string slice.
			pub fn as_str(&self) -> &str {
				&self.0
			}

			/// Returns true if the name is the empty string.
			pub fn is_empty(&self) -> bool {
				self.0.is_empty()
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				f.write_str(&self.0)
			}
		}

		impl From<&str> for $name {
			fn from(name: &str) -> Self {
				Self::new(name)
			}
		}

		impl From<String> for $name {
			fn from(name: String) -> Self {
				Self::new(name)
			}
		}

		impl From<&$name> for $name {
			fn from(name: &$name) -> Self {
				name.clone()
			}
		}

		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}

		impl Borrow<str> for $name {
			fn borrow(&self) -> &str {
				&self.0
			}
		}
	};
}

define_name_type!(
	Role,
	"A caller's standing relative to a resource, e.g. `owner` or `admin`."
);
define_name_type!(
	Action,
	"An operation being gated, e.g. `documents.write`."
);
define_name_type!(
	Scope,
	"Multi-tenancy qualifier narrowing where a role applies. Empty means global."
);

impl Scope {
	/// The global scope.
	pub const GLOBAL: Scope = Scope::from_static("");

	/// Returns true if this is the global (empty) scope.
	pub fn is_global(&self) -> bool {
		self.is_empty()
	}
}

// =============================================================================
// Object Identifiers
// =============================================================================

/// Identifier of the object a request targets, as extracted by the transport.
///
/// The engine never interprets it; fetchers convert it into their own key type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(untagged)]
pub enum ObjectId {
	/// No identifier was supplied (typical for wildcard resources).
	#[default]
	None,
	String(String),
	Int(i64),
	Uuid(Uuid),
}

impl ObjectId {
	/// Short name of the variant, used in type mismatch errors.
	pub fn kind(&self) -> &'static str {
		match self {
			ObjectId::None => "none",
			ObjectId::String(_) => "string",
			ObjectId::Int(_) => "int",
			ObjectId::Uuid(_) => "uuid",
		}
	}

	pub fn is_none(&self) -> bool {
		matches!(self, ObjectId::None)
	}
}

impl fmt::Display for ObjectId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ObjectId::None => Ok(()),
			ObjectId::String(s) => f.write_str(s),
			ObjectId::Int(n) => write!(f, "{n}"),
			ObjectId::Uuid(u) => write!(f, "{u}"),
		}
	}
}

impl From<&str> for ObjectId {
	fn from(id: &str) -> Self {
		ObjectId::String(id.to_string())
	}
}

impl From<String> for ObjectId {
	fn from(id: String) -> Self {
		ObjectId::String(id)
	}
}

impl From<i64> for ObjectId {
	fn from(id: i64) -> Self {
		ObjectId::Int(id)
	}
}

impl From<i32> for ObjectId {
	fn from(id: i32) -> Self {
		ObjectId::Int(i64::from(id))
	}
}

impl From<Uuid> for ObjectId {
	fn from(id: Uuid) -> Self {
		ObjectId::Uuid(id)
	}
}

impl<T: Into<ObjectId>> From<Option<T>> for ObjectId {
	fn from(id: Option<T>) -> Self {
		id.map(Into::into).unwrap_or_default()
	}
}

// =============================================================================
// Identity
// =============================================================================

/// A verified caller identity, as produced by the authentication layer.
///
/// Roles are deliberately absent: they are derived per object by role describers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
	/// Identity-provider specific identifier (the `sub` claim).
	pub subject: String,
	/// Name of the identity provider that authenticated the caller.
	pub provider: String,
	pub email: Option<String>,
	pub email_verified: bool,
	pub name: Option<String>,
	/// Session that authenticated the identity (the `jti` claim).
	pub session_id: Option<String>,
}

impl Identity {
	/// Creates an identity with only a subject and provider.
	pub fn new(subject: impl Into<String>, provider: impl Into<String>) -> Self {
		Self {
			subject: subject.into(),
			provider: provider.into(),
			email: None,
			email_verified: false,
			name: None,
			session_id: None,
		}
	}

	/// Builder: set the email address and whether the provider verified it.
	pub fn with_email(mut self, email: impl Into<String>, verified: bool) -> Self {
		self.email = Some(email.into());
		self.email_verified = verified;
		self
	}

	/// Builder: set the display name.
	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}

	/// Builder: set the session ID.
	pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
		self.session_id = Some(session_id.into());
		self
	}
}
