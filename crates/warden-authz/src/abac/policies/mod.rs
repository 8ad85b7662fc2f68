// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The platform's default policy table.
//!
//! Stores, employees, roles, org units and purchase orders are flat capability
//! checks (RBAC). Suppliers and approval requests depend on ownership and status,
//! so they are governed by per-role rules (ABAC).

mod approval;
mod supplier;

use super::registry::PolicyTable;
use crate::types::ResourceType;

/// Role slugs referenced by the default policy table.
pub mod roles {
	pub const ADMIN: &str = "admin";
	pub const OWNER: &str = "owner";
	pub const PROCUREMENT: &str = "procurement";
	pub const SUPPLIER_CONTACT: &str = "supplier-contact";
	pub const REQUESTER: &str = "requester";
	pub const APPROVER: &str = "approver";
}

/// Builds the default policy table.
pub fn default_policies() -> PolicyTable {
	let builder = PolicyTable::builder()
		.rbac(ResourceType::Store)
		.rbac(ResourceType::Employee)
		.rbac(ResourceType::Role)
		.rbac(ResourceType::OrgUnit)
		.rbac(ResourceType::PurchaseOrder);

	let builder = supplier::register(builder);
	let builder = approval::register(builder);
	builder.build()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::abac::AccessModel;

	#[test]
	fn every_resource_type_has_exactly_one_model() {
		let table = default_policies();
		for resource_type in ResourceType::all() {
			assert!(
				table.model(*resource_type).is_some(),
				"{resource_type} has no model"
			);
		}
	}

	#[test]
	fn abac_types_carry_rules() {
		let table = default_policies();
		for resource_type in table.resource_types() {
			match table.model(resource_type) {
				Some(AccessModel::Abac) => assert!(table.has_policies(resource_type)),
				Some(AccessModel::Rbac) => assert!(!table.has_policies(resource_type)),
				None => unreachable!(),
			}
		}
		assert_eq!(table.model(ResourceType::Supplier), Some(AccessModel::Abac));
		assert_eq!(
			table.model(ResourceType::ApprovalRequest),
			Some(AccessModel::Abac)
		);
		assert_eq!(table.model(ResourceType::Store), Some(AccessModel::Rbac));
	}
}
