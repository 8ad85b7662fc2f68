// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SQLite storage for the warden authorization engine.
//!
//! Provides [`SqlitePermissionRepository`], the production
//! [`PermissionRepository`](warden_authz::PermissionRepository), plus pool
//! construction and schema migrations.

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

#[cfg(test)]
pub mod testing;

pub use error::{DbError, Result};
pub use migrations::run_migrations;
pub use pool::create_pool;
pub use repository::SqlitePermissionRepository;

#[cfg(test)]
mod gate_tests {
	use std::sync::Arc;
	use warden_authz::{
		default_policies, Action, AuthorizationGate, DecisionReason, Permission, PolicyRegistry,
		ResourceAttributes, ResourceType, SubjectKind,
	};

	use super::testing::*;
	use super::SqlitePermissionRepository;

	#[tokio::test]
	async fn gate_over_sqlite_resolves_roles_and_policies() {
		let pool = create_authz_test_pool().await;
		let unit = insert_org_unit(&pool, "north").await;
		let id = insert_subject(&pool, SubjectKind::Employee, Some(unit)).await;
		insert_role(&pool, "manager").await;
		insert_role(&pool, "owner").await;
		grant_role_permission(&pool, "manager", "employees:list").await;
		assign_role(&pool, id, "manager", Some(unit), 1).await;
		assign_role(&pool, id, "owner", None, 2).await;

		let gate = AuthorizationGate::new(
			Arc::new(SqlitePermissionRepository::new(pool.clone())),
			Arc::new(PolicyRegistry::new(default_policies())),
		);

		assert!(
			gate
				.authorize_by_permission(id, Permission::EmployeesList)
				.await
				.granted
		);
		assert!(
			!gate
				.authorize_by_permission(id, Permission::EmployeesDelete)
				.await
				.granted
		);

		let own = ResourceAttributes::new().with("owner_id", id.to_string());
		let result = gate
			.authorize(id, ResourceType::Supplier, Action::Update, Some(&own), None)
			.await;
		assert!(result.granted);
	}

	#[tokio::test]
	async fn storage_failure_denies() {
		let pool = create_authz_test_pool().await;
		let id = insert_subject(&pool, SubjectKind::Employee, None).await;
		grant_subject_permission(&pool, id, "stores:list").await;

		let gate = AuthorizationGate::new(
			Arc::new(SqlitePermissionRepository::new(pool.clone())),
			Arc::new(PolicyRegistry::new(default_policies())),
		);
		pool.close().await;

		let result = gate.authorize_by_permission(id, Permission::StoresList).await;
		assert!(!result.granted);
		assert_eq!(result.reason, DecisionReason::SubjectNotResolvable);
	}
}
