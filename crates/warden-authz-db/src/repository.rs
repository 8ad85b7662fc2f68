// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SQLite permission repository.
//!
//! Read-only access to subjects, role assignments and permission grants. Rows
//! with a non-NULL `deleted_at` are invisible. Role assignments are returned in
//! `(created_at, id)` order and scoped to the subject's current org unit.

use async_trait::async_trait;
use sqlx::{sqlite::SqlitePool, Row};
use std::collections::HashMap;
use std::str::FromStr;
use warden_authz::repository::dedupe_roles;
use warden_authz::{
	OrgUnitId, PermissionRepository, RepositoryError, RoleId, SubjectId, SubjectKind, SubjectRecord,
};

use crate::error::DbError;

#[async_trait]
impl PermissionRepository for SqlitePermissionRepository {
	async fn fetch_subject(&self, id: SubjectId) -> Result<Option<SubjectRecord>, RepositoryError> {
		Ok(self.fetch_subject(id).await?)
	}

	async fn fetch_direct_permissions(&self, id: SubjectId) -> Result<Vec<String>, RepositoryError> {
		Ok(self.fetch_direct_permissions(id).await?)
	}

	async fn fetch_role_assignments(&self, id: SubjectId) -> Result<Vec<RoleId>, RepositoryError> {
		Ok(self.fetch_role_assignments(id).await?)
	}

	async fn fetch_role_permissions(
		&self,
		roles: &[RoleId],
	) -> Result<HashMap<RoleId, Vec<String>>, RepositoryError> {
		Ok(self.fetch_role_permissions(roles).await?)
	}
}

/// Repository for authorization reads.
#[derive(Clone)]
pub struct SqlitePermissionRepository {
	pool: SqlitePool,
}

impl SqlitePermissionRepository {
	/// Create a new repository with the given pool.
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Get a live subject by ID.
	///
	/// # Returns
	/// `None` if no subject exists with this ID or if soft-deleted.
	#[tracing::instrument(skip(self), fields(subject_id = %id))]
	pub async fn fetch_subject(&self, id: SubjectId) -> Result<Option<SubjectRecord>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, kind, org_unit_id
			FROM subjects
			WHERE id = ? AND deleted_at IS NULL
			"#,
		)
		.bind(id.to_string())
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| row_to_subject(&r)).transpose()
	}

	/// Permission strings granted directly to a live subject.
	#[tracing::instrument(skip(self), fields(subject_id = %id))]
	pub async fn fetch_direct_permissions(&self, id: SubjectId) -> Result<Vec<String>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT sp.permission
			FROM subject_permissions sp
			JOIN subjects s ON s.id = sp.subject_id
			WHERE sp.subject_id = ? AND s.deleted_at IS NULL
			ORDER BY sp.created_at, sp.permission
			"#,
		)
		.bind(id.to_string())
		.fetch_all(&self.pool)
		.await?;

		Ok(rows.iter().map(|r| r.get("permission")).collect())
	}

	/// Role ids assigned to a subject.
	///
	/// An assignment counts when it is global (`org_unit_id IS NULL`) or matches
	/// the subject's current org unit. Assignments, subjects and roles that are
	/// soft-deleted are skipped. Ordered by assignment `created_at`, then `id`;
	/// repeated roles keep their first position.
	#[tracing::instrument(skip(self), fields(subject_id = %id))]
	pub async fn fetch_role_assignments(&self, id: SubjectId) -> Result<Vec<RoleId>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT ra.role_id
			FROM role_assignments ra
			JOIN subjects s ON s.id = ra.subject_id
			JOIN roles r ON r.id = ra.role_id
			WHERE ra.subject_id = ?
				AND ra.deleted_at IS NULL
				AND s.deleted_at IS NULL
				AND r.deleted_at IS NULL
				AND (ra.org_unit_id IS NULL OR ra.org_unit_id = s.org_unit_id)
			ORDER BY ra.created_at, ra.id
			"#,
		)
		.bind(id.to_string())
		.fetch_all(&self.pool)
		.await?;

		let roles = rows
			.iter()
			.map(|r| RoleId::new(r.get::<String, _>("role_id")));
		Ok(dedupe_roles(roles))
	}

	/// Permission strings of the given live roles.
	#[tracing::instrument(skip(self, roles), fields(role_count = roles.len()))]
	pub async fn fetch_role_permissions(
		&self,
		roles: &[RoleId],
	) -> Result<HashMap<RoleId, Vec<String>>, DbError> {
		if roles.is_empty() {
			return Ok(HashMap::new());
		}

		let placeholders = vec!["?"; roles.len()].join(", ");
		let sql = format!(
			r#"
			SELECT rp.role_id, rp.permission
			FROM role_permissions rp
			JOIN roles r ON r.id = rp.role_id
			WHERE r.deleted_at IS NULL AND rp.role_id IN ({placeholders})
			ORDER BY rp.role_id, rp.created_at, rp.permission
			"#
		);

		let mut query = sqlx::query(&sql);
		for role in roles {
			query = query.bind(role.as_str());
		}
		let rows = query.fetch_all(&self.pool).await?;

		let mut out: HashMap<RoleId, Vec<String>> = HashMap::new();
		for row in &rows {
			let role: String = row.get("role_id");
			out
				.entry(RoleId::new(role))
				.or_default()
				.push(row.get("permission"));
		}
		Ok(out)
	}
}

fn row_to_subject(row: &sqlx::sqlite::SqliteRow) -> Result<SubjectRecord, DbError> {
	let id_str: String = row.get("id");
	let kind_str: String = row.get("kind");
	let org_unit_str: Option<String> = row.get("org_unit_id");

	let id = SubjectId::from_str(&id_str)
		.map_err(|e| DbError::Corrupt(format!("Invalid subject ID: {e}")))?;
	let kind = SubjectKind::from_str(&kind_str)
		.map_err(|e| DbError::Corrupt(format!("Invalid subject kind: {e}")))?;
	let org_unit_id = org_unit_str
		.map(|s| OrgUnitId::from_str(&s))
		.transpose()
		.map_err(|e| DbError::Corrupt(format!("Invalid org unit ID: {e}")))?;

	Ok(SubjectRecord {
		id,
		kind,
		org_unit_id,
	})
}
