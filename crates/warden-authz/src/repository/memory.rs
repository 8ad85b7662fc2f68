// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-memory permission repository.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

use super::{dedupe_roles, PermissionRepository, SubjectRecord};
use crate::error::RepositoryError;
use crate::types::{OrgUnitId, RoleId, SubjectId};

#[derive(Debug, Default)]
struct RoleRow {
	permissions: Vec<String>,
	deleted: bool,
}

#[derive(Debug)]
struct AssignmentRow {
	subject_id: SubjectId,
	role_id: RoleId,
	org_unit_id: Option<OrgUnitId>,
	deleted: bool,
}

#[derive(Debug, Default)]
struct State {
	subjects: HashMap<SubjectId, (SubjectRecord, bool)>,
	roles: HashMap<RoleId, RoleRow>,
	/// Insertion order is creation order.
	assignments: Vec<AssignmentRow>,
	direct: HashMap<SubjectId, Vec<String>>,
	fail_next: Option<RepositoryError>,
}

/// A [`PermissionRepository`] backed by process memory.
///
/// Mirrors the SQL repository's visibility rules (soft delete, org-unit scope,
/// assignment order) so tests and embedders see the same behaviour.
#[derive(Debug, Default)]
pub struct MemoryPermissionRepository {
	state: RwLock<State>,
}

impl MemoryPermissionRepository {
	pub fn new() -> Self {
		Self::default()
	}

	/// Inserts or replaces a subject (and undeletes it).
	pub fn upsert_subject(&self, record: SubjectRecord) {
		self.state.write().subjects.insert(record.id, (record, false));
	}

	pub fn soft_delete_subject(&self, id: SubjectId) {
		if let Some(entry) = self.state.write().subjects.get_mut(&id) {
			entry.1 = true;
		}
	}

	/// Moves a subject to another org unit (or none).
	pub fn set_org_unit(&self, id: SubjectId, org_unit_id: Option<OrgUnitId>) {
		if let Some(entry) = self.state.write().subjects.get_mut(&id) {
			entry.0.org_unit_id = org_unit_id;
		}
	}

	pub fn grant_direct_permission(&self, id: SubjectId, permission: impl Into<String>) {
		let permission = permission.into();
		let mut state = self.state.write();
		let perms = state.direct.entry(id).or_default();
		if !perms.contains(&permission) {
			perms.push(permission);
		}
	}

	pub fn revoke_direct_permission(&self, id: SubjectId, permission: &str) {
		if let Some(perms) = self.state.write().direct.get_mut(&id) {
			perms.retain(|p| p != permission);
		}
	}

	/// Creates the role if needed.
	pub fn create_role(&self, role: impl Into<RoleId>) {
		self.state.write().roles.entry(role.into()).or_default();
	}

	/// Adds a permission string to a role, creating the role if needed.
	pub fn grant_role_permission(&self, role: impl Into<RoleId>, permission: impl Into<String>) {
		let permission = permission.into();
		let mut state = self.state.write();
		let row = state.roles.entry(role.into()).or_default();
		if !row.permissions.contains(&permission) {
			row.permissions.push(permission);
		}
	}

	pub fn revoke_role_permission(&self, role: &RoleId, permission: &str) {
		if let Some(row) = self.state.write().roles.get_mut(role) {
			row.permissions.retain(|p| p != permission);
		}
	}

	pub fn soft_delete_role(&self, role: &RoleId) {
		if let Some(row) = self.state.write().roles.get_mut(role) {
			row.deleted = true;
		}
	}

	/// Appends a global assignment.
	pub fn assign_role(&self, subject_id: SubjectId, role: impl Into<RoleId>) {
		self.push_assignment(subject_id, role.into(), None);
	}

	/// Appends an assignment scoped to one org unit.
	pub fn assign_role_in(&self, subject_id: SubjectId, role: impl Into<RoleId>, org_unit_id: OrgUnitId) {
		self.push_assignment(subject_id, role.into(), Some(org_unit_id));
	}

	fn push_assignment(&self, subject_id: SubjectId, role_id: RoleId, org_unit_id: Option<OrgUnitId>) {
		self.state.write().assignments.push(AssignmentRow {
			subject_id,
			role_id,
			org_unit_id,
			deleted: false,
		});
	}

	/// Soft-deletes every assignment of `role` to the subject.
	pub fn unassign_role(&self, subject_id: SubjectId, role: &RoleId) {
		for row in self.state.write().assignments.iter_mut() {
			if row.subject_id == subject_id && &row.role_id == role {
				row.deleted = true;
			}
		}
	}

	/// Makes the next repository call fail with `error`.
	pub fn fail_next(&self, error: RepositoryError) {
		self.state.write().fail_next = Some(error);
	}

	fn take_failure(&self) -> Result<(), RepositoryError> {
		match self.state.write().fail_next.take() {
			Some(error) => Err(error),
			None => Ok(()),
		}
	}

	fn live_subject(state: &State, id: SubjectId) -> Option<&SubjectRecord> {
		match state.subjects.get(&id) {
			Some((record, false)) => Some(record),
			_ => None,
		}
	}
}

#[async_trait]
impl PermissionRepository for MemoryPermissionRepository {
	async fn fetch_subject(&self, id: SubjectId) -> Result<Option<SubjectRecord>, RepositoryError> {
		self.take_failure()?;
		let state = self.state.read();
		Ok(Self::live_subject(&state, id).cloned())
	}

	async fn fetch_direct_permissions(&self, id: SubjectId) -> Result<Vec<String>, RepositoryError> {
		self.take_failure()?;
		let state = self.state.read();
		if Self::live_subject(&state, id).is_none() {
			return Ok(Vec::new());
		}
		Ok(state.direct.get(&id).cloned().unwrap_or_default())
	}

	async fn fetch_role_assignments(&self, id: SubjectId) -> Result<Vec<RoleId>, RepositoryError> {
		self.take_failure()?;
		let state = self.state.read();
		let Some(subject) = Self::live_subject(&state, id) else {
			return Ok(Vec::new());
		};

		let roles = state
			.assignments
			.iter()
			.filter(|a| a.subject_id == id && !a.deleted)
			.filter(|a| a.org_unit_id.is_none() || a.org_unit_id == subject.org_unit_id)
			.filter(|a| matches!(state.roles.get(&a.role_id), Some(row) if !row.deleted))
			.map(|a| a.role_id.clone());
		Ok(dedupe_roles(roles))
	}

	async fn fetch_role_permissions(
		&self,
		roles: &[RoleId],
	) -> Result<HashMap<RoleId, Vec<String>>, RepositoryError> {
		self.take_failure()?;
		let state = self.state.read();
		Ok(roles
			.iter()
			.filter_map(|role| match state.roles.get(role) {
				Some(row) if !row.deleted => Some((role.clone(), row.permissions.clone())),
				_ => None,
			})
			.collect())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::types::SubjectKind;

	fn seeded() -> (MemoryPermissionRepository, SubjectId, OrgUnitId) {
		let repo = MemoryPermissionRepository::new();
		let unit = OrgUnitId::generate();
		let id = SubjectId::generate();
		repo.upsert_subject(SubjectRecord::new(id, SubjectKind::Employee).in_org_unit(unit));
		(repo, id, unit)
	}

	fn roles(list: &[&str]) -> Vec<RoleId> {
		list.iter().map(|r| RoleId::from(*r)).collect()
	}

	#[tokio::test]
	async fn assignments_keep_creation_order() {
		let (repo, id, _) = seeded();
		for role in ["zeta", "alpha", "mid"] {
			repo.create_role(role);
			repo.assign_role(id, role);
		}
		assert_eq!(
			repo.fetch_role_assignments(id).await.unwrap(),
			roles(&["zeta", "alpha", "mid"])
		);
	}

	#[tokio::test]
	async fn assignments_are_scoped_by_org_unit() {
		let (repo, id, unit) = seeded();
		repo.create_role("global");
		repo.create_role("local");
		repo.create_role("elsewhere");
		repo.assign_role(id, "global");
		repo.assign_role_in(id, "local", unit);
		repo.assign_role_in(id, "elsewhere", OrgUnitId::generate());

		assert_eq!(
			repo.fetch_role_assignments(id).await.unwrap(),
			roles(&["global", "local"])
		);

		repo.set_org_unit(id, None);
		assert_eq!(repo.fetch_role_assignments(id).await.unwrap(), roles(&["global"]));
	}

	#[tokio::test]
	async fn soft_deleted_rows_are_invisible() {
		let (repo, id, _) = seeded();
		repo.grant_role_permission("a", "stores:create");
		repo.grant_role_permission("b", "stores:delete");
		repo.assign_role(id, "a");
		repo.assign_role(id, "b");

		repo.soft_delete_role(&RoleId::from("a"));
		repo.unassign_role(id, &RoleId::from("b"));
		assert!(repo.fetch_role_assignments(id).await.unwrap().is_empty());

		let perms = repo.fetch_role_permissions(&roles(&["a", "b"])).await.unwrap();
		assert!(!perms.contains_key(&RoleId::from("a")));
		assert_eq!(perms[&RoleId::from("b")], vec!["stores:delete".to_string()]);

		repo.soft_delete_subject(id);
		assert_eq!(repo.fetch_subject(id).await.unwrap(), None);
	}

	#[tokio::test]
	async fn duplicate_assignments_collapse() {
		let (repo, id, unit) = seeded();
		repo.create_role("a");
		repo.create_role("b");
		repo.assign_role(id, "a");
		repo.assign_role(id, "b");
		repo.assign_role_in(id, "a", unit);

		assert_eq!(repo.fetch_role_assignments(id).await.unwrap(), roles(&["a", "b"]));
	}

	#[tokio::test]
	async fn dangling_assignment_is_dropped() {
		let (repo, id, _) = seeded();
		repo.assign_role(id, "never-created");
		assert!(repo.fetch_role_assignments(id).await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn fail_next_fails_once() {
		let (repo, id, _) = seeded();
		repo.fail_next(RepositoryError::Unavailable("down".into()));

		assert!(matches!(
			repo.fetch_subject(id).await,
			Err(RepositoryError::Unavailable(_))
		));
		assert!(repo.fetch_subject(id).await.unwrap().is_some());
	}
}
