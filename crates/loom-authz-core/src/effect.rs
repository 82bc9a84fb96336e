// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseEffectError;

/// Outcome of a policy: allow or deny.
///
/// `Deny` is the zero value so anything left unset fails closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effect {
	#[default]
	Deny,
	Allow,
}

impl Effect {
	pub fn is_allow(self) -> bool {
		self == Effect::Allow
	}

	pub fn is_deny(self) -> bool {
		self == Effect::Deny
	}

	/// The opposite effect.
	pub fn reverse(self) -> Effect {
		match self {
			Effect::Allow => Effect::Deny,
			Effect::Deny => Effect::Allow,
		}
	}

	/// Combines matched effects: any deny wins, otherwise any allow wins,
	/// otherwise `default` applies.
	pub fn combine<I>(effects: I, default: Effect) -> Effect
	where
		I: IntoIterator<Item = Effect>,
	{
		let mut saw_allow = false;
		for effect in effects {
			match effect {
				Effect::Deny => return Effect::Deny,
				Effect::Allow => saw_allow = true,
			}
		}
		if saw_allow {
			Effect::Allow
		} else {
			default
		}
	}
}

impl fmt::Display for Effect {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Effect::Allow => f.write_str("ALLOW"),
			Effect::Deny => f.write_str("DENY"),
		}
	}
}

impl FromStr for Effect {
	type Err = ParseEffectError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"allow" => Ok(Effect::Allow),
			"deny" => Ok(Effect::Deny),
			_ => Err(ParseEffectError(s.to_string())),
		}
	}
}
