// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Composable fetchers and role describers for common resource shapes.

pub mod fetchers;
pub mod roles;

pub use fetchers::{
	compose_fetchers, default_fetcher, fetcher, map_fetcher, transform_key, validated_fetcher,
};
pub use roles::{
	compose, compose_scoped, conditional_role, describer, global_role, identity_ownership_role,
	membership_roles, ownership_role, scope_roles, static_role, static_roles, validate_scope,
	ScopedObject,
};
