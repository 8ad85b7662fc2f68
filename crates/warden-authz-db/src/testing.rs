// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Test helpers: a migrated in-memory pool and row seeding.
//!
//! The engine never writes these tables; the CRUD layer owns them. Tests seed
//! rows directly with SQL.

use chrono::{DateTime, Duration, SecondsFormat, TimeZone, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use uuid::Uuid;
use warden_authz::{OrgUnitId, SubjectId, SubjectKind};

use crate::migrations::run_migrations;

/// A single-connection in-memory pool. More connections would each see their
/// own empty database.
pub async fn create_test_pool() -> SqlitePool {
	let options = SqliteConnectOptions::from_str(":memory:")
		.unwrap()
		.foreign_keys(true);
	SqlitePoolOptions::new()
		.max_connections(1)
		.connect_with(options)
		.await
		.unwrap()
}

pub async fn create_authz_test_pool() -> SqlitePool {
	let pool = create_test_pool().await;
	run_migrations(&pool).await.unwrap();
	pool
}

/// Deterministic timestamp `offset` seconds after a fixed epoch.
pub fn ts(offset: i64) -> String {
	let base: DateTime<Utc> = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
	(base + Duration::seconds(offset)).to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub async fn insert_org_unit(pool: &SqlitePool, name: &str) -> OrgUnitId {
	let id = OrgUnitId::generate();
	sqlx::query("INSERT INTO org_units (id, name, created_at) VALUES (?, ?, ?)")
		.bind(id.to_string())
		.bind(name)
		.bind(ts(0))
		.execute(pool)
		.await
		.unwrap();
	id
}

pub async fn insert_subject(
	pool: &SqlitePool,
	kind: SubjectKind,
	org_unit_id: Option<OrgUnitId>,
) -> SubjectId {
	let id = SubjectId::generate();
	sqlx::query("INSERT INTO subjects (id, kind, org_unit_id, created_at) VALUES (?, ?, ?, ?)")
		.bind(id.to_string())
		.bind(kind.as_str())
		.bind(org_unit_id.map(|o| o.to_string()))
		.bind(ts(0))
		.execute(pool)
		.await
		.unwrap();
	id
}

pub async fn insert_role(pool: &SqlitePool, slug: &str) {
	sqlx::query("INSERT INTO roles (id, name, created_at) VALUES (?, ?, ?)")
		.bind(slug)
		.bind(slug)
		.bind(ts(0))
		.execute(pool)
		.await
		.unwrap();
}

pub async fn grant_role_permission(pool: &SqlitePool, role: &str, permission: &str) {
	sqlx::query("INSERT INTO role_permissions (role_id, permission, created_at) VALUES (?, ?, ?)")
		.bind(role)
		.bind(permission)
		.bind(ts(0))
		.execute(pool)
		.await
		.unwrap();
}

pub async fn grant_subject_permission(pool: &SqlitePool, subject: SubjectId, permission: &str) {
	sqlx::query(
		"INSERT INTO subject_permissions (subject_id, permission, created_at) VALUES (?, ?, ?)",
	)
	.bind(subject.to_string())
	.bind(permission)
	.bind(ts(0))
	.execute(pool)
	.await
	.unwrap();
}

/// Inserts an assignment created `created_offset` seconds after the epoch.
/// Returns the assignment id.
pub async fn assign_role(
	pool: &SqlitePool,
	subject: SubjectId,
	role: &str,
	org_unit_id: Option<OrgUnitId>,
	created_offset: i64,
) -> String {
	let id = Uuid::new_v4().to_string();
	sqlx::query(
		r#"
		INSERT INTO role_assignments (id, subject_id, role_id, org_unit_id, created_at)
		VALUES (?, ?, ?, ?, ?)
		"#,
	)
	.bind(&id)
	.bind(subject.to_string())
	.bind(role)
	.bind(org_unit_id.map(|o| o.to_string()))
	.bind(ts(created_offset))
	.execute(pool)
	.await
	.unwrap();
	id
}

/// Sets `deleted_at` on a row of `table` whose `id` column equals `id`.
pub async fn soft_delete(pool: &SqlitePool, table: &str, id: &str) {
	sqlx::query(&format!("UPDATE {table} SET deleted_at = ? WHERE id = ?"))
		.bind(ts(1_000))
		.bind(id)
		.execute(pool)
		.await
		.unwrap();
}
