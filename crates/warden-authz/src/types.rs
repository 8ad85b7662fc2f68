// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core type definitions shared by both authorization models.
//!
//! - **ID newtypes**: [`SubjectId`] and [`OrgUnitId`] wrap UUIDs so they cannot be
//!   mixed up; [`RoleId`] is a role slug so policy tables can name roles statically
//! - **Subject classes**: [`SubjectKind`] (employee, supplier, admin)
//! - **Resource and action tags**: [`ResourceType`] and [`Action`], closed enums that
//!   key both the permission catalog and the policy registry
//!
//! String forms are kebab-case and stable; they appear in permission tokens,
//! audit records and configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// =============================================================================
// ID Newtypes
// =============================================================================

macro_rules! define_id_type {
	($name:ident, $doc:expr) => {
		#[doc = $doc]
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
		#[serde(transparent)]
		pub struct $name(Uuid);

		impl $name {
			/// Create a new ID from a UUID.
			pub fn new(id: Uuid) -> Self {
				Self(id)
			}

			/// Generate a new random ID.
			pub fn generate() -> Self {
				Self(Uuid::new_v4())
			}

			/// Get the inner UUID value.
			pub fn into_inner(self) -> Uuid {
				self.0
			}

			/// Get a reference to the inner UUID.
			pub fn as_uuid(&self) -> &Uuid {
				&self.0
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				write!(f, "{}", self.0)
			}
		}

		impl From<Uuid> for $name {
			fn from(id: Uuid) -> Self {
				Self(id)
			}
		}

		impl From<$name> for Uuid {
			fn from(id: $name) -> Self {
				id.0
			}
		}

		impl FromStr for $name {
			type Err = uuid::Error;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Uuid::parse_str(s).map(Self)
			}
		}
	};
}

define_id_type!(SubjectId, "Unique identifier for an authenticated subject.");
define_id_type!(OrgUnitId, "Unique identifier for an organizational unit.");

/// Identifier of a role record.
///
/// Roles are keyed by slug (`manager`, `approver`, ...). The same identity is used
/// for the role's RBAC permission set and for its entries in the policy registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleId(String);

impl RoleId {
	pub fn new(slug: impl Into<String>) -> Self {
		Self(slug.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for RoleId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for RoleId {
	fn from(slug: &str) -> Self {
		Self(slug.to_string())
	}
}

impl From<String> for RoleId {
	fn from(slug: String) -> Self {
		Self(slug)
	}
}

// =============================================================================
// Subject Kind
// =============================================================================

/// The class of actor a subject belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectKind {
	/// Internal staff member.
	Employee,
	/// External supplier account.
	Supplier,
	/// Platform administrator.
	Admin,
}

impl SubjectKind {
	pub fn as_str(&self) -> &'static str {
		match self {
			SubjectKind::Employee => "employee",
			SubjectKind::Supplier => "supplier",
			SubjectKind::Admin => "admin",
		}
	}
}

impl fmt::Display for SubjectKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for SubjectKind {
	type Err = UnknownTag;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"employee" => Ok(SubjectKind::Employee),
			"supplier" => Ok(SubjectKind::Supplier),
			"admin" => Ok(SubjectKind::Admin),
			other => Err(UnknownTag::new("subject kind", other)),
		}
	}
}

// =============================================================================
// Resource Types and Actions
// =============================================================================

/// Error returned when a string tag does not name a known enum member.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownTag {
	pub kind: &'static str,
	pub value: String,
}

impl UnknownTag {
	fn new(kind: &'static str, value: &str) -> Self {
		Self {
			kind,
			value: value.to_string(),
		}
	}
}

/// Types of resources protected by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceType {
	Supplier,
	Store,
	ApprovalRequest,
	Employee,
	Role,
	OrgUnit,
	PurchaseOrder,
}

impl ResourceType {
	/// Returns all resource types.
	pub fn all() -> &'static [ResourceType] {
		&[
			ResourceType::Supplier,
			ResourceType::Store,
			ResourceType::ApprovalRequest,
			ResourceType::Employee,
			ResourceType::Role,
			ResourceType::OrgUnit,
			ResourceType::PurchaseOrder,
		]
	}

	/// The tag used as the policy registry key.
	pub fn as_str(&self) -> &'static str {
		match self {
			ResourceType::Supplier => "supplier",
			ResourceType::Store => "store",
			ResourceType::ApprovalRequest => "approval-request",
			ResourceType::Employee => "employee",
			ResourceType::Role => "role",
			ResourceType::OrgUnit => "org-unit",
			ResourceType::PurchaseOrder => "purchase-order",
		}
	}

	/// The namespace used in permission tokens (`<namespace>:<action>`).
	pub fn permission_namespace(&self) -> &'static str {
		match self {
			ResourceType::Supplier => "suppliers",
			ResourceType::Store => "stores",
			ResourceType::ApprovalRequest => "approval-requests",
			ResourceType::Employee => "employees",
			ResourceType::Role => "roles",
			ResourceType::OrgUnit => "org-units",
			ResourceType::PurchaseOrder => "purchase-orders",
		}
	}
}

impl fmt::Display for ResourceType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for ResourceType {
	type Err = UnknownTag;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		ResourceType::all()
			.iter()
			.copied()
			.find(|t| t.as_str() == s)
			.ok_or_else(|| UnknownTag::new("resource type", s))
	}
}

/// Actions that can be performed on resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
	View,
	List,
	GetById,
	Create,
	Update,
	UpdateStatus,
	Delete,
	Approve,
	Reject,
	Assign,
}

impl Action {
	/// Returns all actions.
	pub fn all() -> &'static [Action] {
		&[
			Action::View,
			Action::List,
			Action::GetById,
			Action::Create,
			Action::Update,
			Action::UpdateStatus,
			Action::Delete,
			Action::Approve,
			Action::Reject,
			Action::Assign,
		]
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			Action::View => "view",
			Action::List => "list",
			Action::GetById => "get-by-id",
			Action::Create => "create",
			Action::Update => "update",
			Action::UpdateStatus => "update-status",
			Action::Delete => "delete",
			Action::Approve => "approve",
			Action::Reject => "reject",
			Action::Assign => "assign",
		}
	}
}

impl fmt::Display for Action {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Action {
	type Err = UnknownTag;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Action::all()
			.iter()
			.copied()
			.find(|a| a.as_str() == s)
			.ok_or_else(|| UnknownTag::new("action", s))
	}
}
