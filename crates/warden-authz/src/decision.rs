// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Decision results.
//!
//! Every decision, grant or deny, carries a [`DecisionReason`]. Reasons are meant
//! for audit trails and server logs; route handlers should answer end users with
//! a plain "access denied".

use serde::Serialize;
use std::fmt;

use crate::catalog::Permission;
use crate::types::{Action, ResourceType, RoleId};

/// Where an RBAC grant came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "role", rename_all = "snake_case")]
pub enum GrantSource {
	Direct,
	Role(RoleId),
}

impl fmt::Display for GrantSource {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			GrantSource::Direct => f.write_str("direct assignment"),
			GrantSource::Role(role) => write!(f, "role `{role}`"),
		}
	}
}

/// Why a decision came out the way it did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum DecisionReason {
	/// Subject holds no roles and no direct permissions.
	NoPermissions,
	/// ABAC: subject holds no roles.
	NoRoles,
	/// ABAC: the policy registry has no entries for the resource type.
	NoPolicy,
	/// The resource type is not registered under any model.
	ModelNotRegistered,
	/// The checked token is not in the permission catalog.
	UnknownPermission { permission: String },
	/// The subject could not be loaded (missing, or storage failure).
	SubjectNotResolvable,
	UnconditionalGrant { role: RoleId },
	ConditionalGrant { role: RoleId, predicate: &'static str },
	/// ABAC: every role abstained.
	NoRoleGranted { roles: Vec<RoleId> },
	PermissionGranted { permission: Permission, via: GrantSource },
	PermissionMissing { permission: Permission },
}

impl fmt::Display for DecisionReason {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			DecisionReason::NoPermissions => f.write_str("subject has no roles and no permissions"),
			DecisionReason::NoRoles => f.write_str("no roles"),
			DecisionReason::NoPolicy => f.write_str("no policy for resource type"),
			DecisionReason::ModelNotRegistered => {
				f.write_str("resource type is not registered with an access model")
			}
			DecisionReason::UnknownPermission { permission } => {
				write!(f, "unknown permission `{permission}`")
			}
			DecisionReason::SubjectNotResolvable => f.write_str("subject not resolvable"),
			DecisionReason::UnconditionalGrant { role } => {
				write!(f, "granted unconditionally by role `{role}`")
			}
			DecisionReason::ConditionalGrant { role, predicate } => {
				write!(f, "granted by role `{role}` (condition `{predicate}` holds)")
			}
			DecisionReason::NoRoleGranted { roles } => {
				let roles = roles
					.iter()
					.map(RoleId::as_str)
					.collect::<Vec<_>>()
					.join(", ");
				write!(f, "no role granted access (considered: [{roles}])")
			}
			DecisionReason::PermissionGranted { permission, via } => {
				write!(f, "permission `{permission}` held via {via}")
			}
			DecisionReason::PermissionMissing { permission } => {
				write!(f, "permission `{permission}` not held")
			}
		}
	}
}

/// Outcome of one authorization decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessControlResult {
	pub granted: bool,
	pub reason: DecisionReason,
	pub resource_type: String,
	pub action: String,
}

impl AccessControlResult {
	pub fn grant(resource_type: ResourceType, action: Action, reason: DecisionReason) -> Self {
		Self {
			granted: true,
			reason,
			resource_type: resource_type.as_str().to_string(),
			action: action.as_str().to_string(),
		}
	}

	pub fn deny(resource_type: ResourceType, action: Action, reason: DecisionReason) -> Self {
		Self::deny_labels(resource_type.as_str(), action.as_str(), reason)
	}

	/// Denial for requests whose resource type or action could not be typed,
	/// e.g. a permission string outside the catalog.
	pub fn deny_labels(resource_type: &str, action: &str, reason: DecisionReason) -> Self {
		Self {
			granted: false,
			reason,
			resource_type: resource_type.to_string(),
			action: action.to_string(),
		}
	}

	pub fn is_granted(&self) -> bool {
		self.granted
	}

	/// Human-readable reason, for logs and audit records.
	pub fn reason_text(&self) -> String {
		self.reason.to_string()
	}

	/// The role credited with the grant, if any.
	pub fn granting_role(&self) -> Option<&RoleId> {
		match &self.reason {
			DecisionReason::UnconditionalGrant { role }
			| DecisionReason::ConditionalGrant { role, .. } => Some(role),
			DecisionReason::PermissionGranted {
				via: GrantSource::Role(role),
				..
			} => Some(role),
			_ => None,
		}
	}
}
