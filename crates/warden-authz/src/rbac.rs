// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! RBAC evaluation over flat permission tokens.
//!
//! A subject's effective permissions are the union of its direct permissions and
//! the permissions of every role it holds. Membership is exact: there are no
//! wildcards and no implication between tokens.

use std::collections::BTreeSet;

use crate::catalog::Permission;
use crate::decision::{AccessControlResult, DecisionReason, GrantSource};
use crate::subject::{RolePermissions, Subject};

/// Returns the union of direct and role-derived permissions.
pub fn effective_permissions(subject: &Subject, roles: &RolePermissions) -> BTreeSet<Permission> {
	let mut permissions = subject.direct_permissions.clone();
	for role in &subject.roles {
		if let Some(set) = roles.get(role) {
			permissions.extend(set.iter().copied());
		}
	}
	permissions
}

/// Returns true if the subject holds `permission` directly or through any role.
pub fn has_permission(subject: &Subject, roles: &RolePermissions, permission: Permission) -> bool {
	grant_source(subject, roles, permission).is_some()
}

/// Finds where a permission comes from: direct assignment first, then the first
/// role in the subject's role order that carries it.
pub fn grant_source(
	subject: &Subject,
	roles: &RolePermissions,
	permission: Permission,
) -> Option<GrantSource> {
	if subject.direct_permissions.contains(&permission) {
		return Some(GrantSource::Direct);
	}
	subject
		.roles
		.iter()
		.find(|role| roles.role_grants(role, permission))
		.map(|role| GrantSource::Role(role.clone()))
}

/// Evaluates an RBAC check into a decision.
#[tracing::instrument(
	level = "debug",
	skip(subject, roles),
	fields(subject_id = %subject.id, permission = %permission)
)]
pub fn evaluate(
	subject: &Subject,
	roles: &RolePermissions,
	permission: Permission,
) -> AccessControlResult {
	let resource_type = permission.resource_type();
	let action = permission.action();

	if subject.is_empty() {
		return AccessControlResult::deny(resource_type, action, DecisionReason::NoPermissions);
	}

	match grant_source(subject, roles, permission) {
		Some(via) => AccessControlResult::grant(
			resource_type,
			action,
			DecisionReason::PermissionGranted { permission, via },
		),
		None => AccessControlResult::deny(
			resource_type,
			action,
			DecisionReason::PermissionMissing { permission },
		),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::types::{RoleId, SubjectId, SubjectKind};
	use proptest::prelude::*;

	fn employee() -> Subject {
		Subject::new(SubjectId::generate(), SubjectKind::Employee)
	}

	#[test]
	fn manager_lists_but_cannot_delete_employees() {
		let subject = employee().with_role("manager");
		let roles = RolePermissions::new().with("manager", &[Permission::EmployeesList]);

		assert!(has_permission(&subject, &roles, Permission::EmployeesList));
		assert!(!has_permission(&subject, &roles, Permission::EmployeesDelete));
	}

	#[test]
	fn list_does_not_imply_get_by_id() {
		let subject = employee().with_permission(Permission::SuppliersList);
		let roles = RolePermissions::new();

		assert!(has_permission(&subject, &roles, Permission::SuppliersList));
		assert!(!has_permission(&subject, &roles, Permission::SuppliersGetById));
	}

	#[test]
	fn dangling_role_contributes_nothing() {
		let subject = employee().with_role("deleted-role");
		let roles = RolePermissions::new();

		assert!(effective_permissions(&subject, &roles).is_empty());
		let result = evaluate(&subject, &roles, Permission::StoresCreate);
		assert!(!result.granted);
		assert_eq!(
			result.reason,
			DecisionReason::PermissionMissing {
				permission: Permission::StoresCreate
			}
		);
	}

	#[test]
	fn union_of_direct_and_roles() {
		let subject = employee()
			.with_permission(Permission::StoresList)
			.with_role("a")
			.with_role("b");
		let roles = RolePermissions::new()
			.with("a", &[Permission::StoresCreate])
			.with("b", &[Permission::StoresDelete, Permission::StoresCreate]);

		let effective = effective_permissions(&subject, &roles);
		assert_eq!(
			effective.into_iter().collect::<Vec<_>>(),
			vec![
				Permission::StoresList,
				Permission::StoresCreate,
				Permission::StoresDelete
			]
		);
	}

	#[test]
	fn grant_cites_first_role_in_order() {
		let subject = employee().with_role("a").with_role("b");
		let roles = RolePermissions::new()
			.with("a", &[Permission::StoresCreate])
			.with("b", &[Permission::StoresCreate]);

		assert_eq!(
			grant_source(&subject, &roles, Permission::StoresCreate),
			Some(GrantSource::Role(RoleId::from("a")))
		);
	}

	#[test]
	fn direct_grant_takes_precedence_in_reason() {
		let subject = employee()
			.with_role("a")
			.with_permission(Permission::StoresCreate);
		let roles = RolePermissions::new().with("a", &[Permission::StoresCreate]);

		let result = evaluate(&subject, &roles, Permission::StoresCreate);
		assert!(result.granted);
		assert_eq!(
			result.reason,
			DecisionReason::PermissionGranted {
				permission: Permission::StoresCreate,
				via: GrantSource::Direct,
			}
		);
	}

	fn arb_permission() -> impl Strategy<Value = Permission> {
		(0..Permission::ALL.len()).prop_map(|i| Permission::ALL[i])
	}

	proptest! {
		#[test]
		fn empty_subject_is_always_denied(permission in arb_permission()) {
			let subject = employee();
			let roles = RolePermissions::new().with("manager", Permission::ALL);
			let result = evaluate(&subject, &roles, permission);
			prop_assert!(!result.granted);
			prop_assert_eq!(result.reason, DecisionReason::NoPermissions);
		}

		#[test]
		fn granted_iff_in_effective_set(
			direct in proptest::collection::btree_set(arb_permission(), 0..5),
			role_perms in proptest::collection::btree_set(arb_permission(), 0..5),
			checked in arb_permission(),
		) {
			let mut subject = employee().with_role("r");
			subject.direct_permissions = direct;
			let roles = RolePermissions::new()
				.with("r", &role_perms.iter().copied().collect::<Vec<_>>());

			let expected = effective_permissions(&subject, &roles).contains(&checked);
			prop_assert_eq!(evaluate(&subject, &roles, checked).granted, expected);
		}
	}
}
