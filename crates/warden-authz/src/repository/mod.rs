// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The permission repository: the engine's only view of stored state.
//!
//! Implementations are pure I/O adapters. They return permission strings exactly
//! as stored; the gate validates them against the catalog.
//!
//! # Role order contract
//!
//! [`PermissionRepository::fetch_role_assignments`] returns roles ordered by the
//! assignment's creation time, then by assignment id. The ABAC engine uses this
//! order as its tie-break, so every implementation must honour it.
//!
//! # Scoping
//!
//! An assignment applies when it is global (no org unit) or when its org unit is
//! the subject's current org unit. Soft-deleted subjects, assignments and roles
//! are invisible. A role id that appears more than once is kept at its first
//! position.

mod memory;

pub use memory::MemoryPermissionRepository;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::RepositoryError;
use crate::types::{OrgUnitId, RoleId, SubjectId, SubjectKind};

/// A stored subject, without its roles or permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectRecord {
	pub id: SubjectId,
	pub kind: SubjectKind,
	pub org_unit_id: Option<OrgUnitId>,
}

impl SubjectRecord {
	pub fn new(id: SubjectId, kind: SubjectKind) -> Self {
		Self {
			id,
			kind,
			org_unit_id: None,
		}
	}

	pub fn in_org_unit(mut self, org_unit_id: OrgUnitId) -> Self {
		self.org_unit_id = Some(org_unit_id);
		self
	}
}

#[async_trait]
pub trait PermissionRepository: Send + Sync {
	/// Loads the subject record. `Ok(None)` when absent or soft-deleted.
	async fn fetch_subject(&self, id: SubjectId) -> Result<Option<SubjectRecord>, RepositoryError>;

	/// Permission strings granted directly to the subject.
	async fn fetch_direct_permissions(&self, id: SubjectId) -> Result<Vec<String>, RepositoryError>;

	/// Role ids assigned to the subject, scoped and ordered (see module docs).
	async fn fetch_role_assignments(&self, id: SubjectId) -> Result<Vec<RoleId>, RepositoryError>;

	/// Permission strings per role. Roles that are unknown or soft-deleted are
	/// simply absent from the map.
	async fn fetch_role_permissions(
		&self,
		roles: &[RoleId],
	) -> Result<HashMap<RoleId, Vec<String>>, RepositoryError>;
}

/// Collapses duplicate role ids, keeping the first occurrence.
pub fn dedupe_roles(roles: impl IntoIterator<Item = RoleId>) -> Vec<RoleId> {
	let mut out: Vec<RoleId> = Vec::new();
	for role in roles {
		if !out.contains(&role) {
			out.push(role);
		}
	}
	out
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn dedupe_keeps_first_position() {
		let roles = dedupe_roles(
			["b", "a", "b", "c", "a"]
				.into_iter()
				.map(RoleId::from),
		);
		assert_eq!(
			roles,
			vec![RoleId::from("b"), RoleId::from("a"), RoleId::from("c")]
		);
	}
}
