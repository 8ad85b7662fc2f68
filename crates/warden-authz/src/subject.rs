// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The resolved subject of a decision.
//!
//! A [`Subject`] is built once per decision from the permission repository and is
//! an immutable snapshot for the rest of that decision: role order and permission
//! sets cannot change underneath the evaluators.

use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

use crate::catalog::Permission;
use crate::types::{OrgUnitId, RoleId, SubjectId, SubjectKind};

/// Attributes of the actor requesting access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subject {
	pub id: SubjectId,
	pub kind: SubjectKind,
	/// Organizational unit the subject currently belongs to.
	pub org_unit_id: Option<OrgUnitId>,
	/// Roles in assignment order. Order is the ABAC tie-break.
	pub roles: Vec<RoleId>,
	pub direct_permissions: BTreeSet<Permission>,
}

impl Subject {
	/// Creates a subject with no roles and no direct permissions.
	pub fn new(id: SubjectId, kind: SubjectKind) -> Self {
		Self {
			id,
			kind,
			org_unit_id: None,
			roles: Vec::new(),
			direct_permissions: BTreeSet::new(),
		}
	}

	/// Builder: set the org unit.
	pub fn in_org_unit(mut self, org_unit_id: OrgUnitId) -> Self {
		self.org_unit_id = Some(org_unit_id);
		self
	}

	/// Builder: append a role at the end of the role order.
	pub fn with_role(mut self, role: impl Into<RoleId>) -> Self {
		self.roles.push(role.into());
		self
	}

	/// Builder: grant a permission directly.
	pub fn with_permission(mut self, permission: Permission) -> Self {
		self.direct_permissions.insert(permission);
		self
	}

	pub fn has_role(&self, role: &RoleId) -> bool {
		self.roles.contains(role)
	}

	/// True when the subject can never be granted anything.
	pub fn is_empty(&self) -> bool {
		self.roles.is_empty() && self.direct_permissions.is_empty()
	}
}

/// Permission sets attached to roles, as fetched for one decision.
///
/// Roles missing from the map (dangling references, soft-deleted roles, roles
/// stored with no permissions) contribute an empty set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RolePermissions {
	by_role: HashMap<RoleId, BTreeSet<Permission>>,
}

impl RolePermissions {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert(&mut self, role: RoleId, permissions: impl IntoIterator<Item = Permission>) {
		self.by_role.entry(role).or_default().extend(permissions);
	}

	/// Builder form of [`insert`](Self::insert).
	pub fn with(mut self, role: impl Into<RoleId>, permissions: &[Permission]) -> Self {
		self.insert(role.into(), permissions.iter().copied());
		self
	}

	pub fn get(&self, role: &RoleId) -> Option<&BTreeSet<Permission>> {
		self.by_role.get(role)
	}

	pub fn role_grants(&self, role: &RoleId, permission: Permission) -> bool {
		self
			.by_role
			.get(role)
			.map(|set| set.contains(&permission))
			.unwrap_or(false)
	}
}
