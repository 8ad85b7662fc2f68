// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The permission catalog.
//!
//! Every RBAC capability is a `"<namespace>:<action>"` token declared exactly once
//! in [`define_permissions!`] below. Callers compile against [`Permission`], so a
//! typo in a permission name is a build error rather than a silent, permanent
//! denial. Tokens are case-sensitive and flat: `suppliers:list` does not imply
//! `suppliers:get-by-id`.
//!
//! Bump [`CATALOG_VERSION`] whenever a token is added, renamed or removed.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::types::{Action, ResourceType};

/// Version of the permission catalog shipped with this build.
pub const CATALOG_VERSION: u32 = 1;

/// Error returned when a string is not a token in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("permission `{0}` is not in the catalog")]
pub struct UnknownPermission(pub String);

macro_rules! define_permissions {
	($($variant:ident => $token:literal ($resource:ident, $action:ident)),+ $(,)?) => {
		/// A permission token from the closed catalog.
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
		pub enum Permission {
			$($variant,)+
		}

		impl Permission {
			/// Every permission in the catalog, in declaration order.
			pub const ALL: &'static [Permission] = &[$(Permission::$variant,)+];

			/// The canonical `"<namespace>:<action>"` token.
			pub fn as_str(&self) -> &'static str {
				match self {
					$(Permission::$variant => $token,)+
				}
			}

			pub fn resource_type(&self) -> ResourceType {
				match self {
					$(Permission::$variant => ResourceType::$resource,)+
				}
			}

			pub fn action(&self) -> Action {
				match self {
					$(Permission::$variant => Action::$action,)+
				}
			}
		}
	};
}

define_permissions! {
	SuppliersList => "suppliers:list" (Supplier, List),
	SuppliersGetById => "suppliers:get-by-id" (Supplier, GetById),
	SuppliersView => "suppliers:view" (Supplier, View),
	SuppliersCreate => "suppliers:create" (Supplier, Create),
	SuppliersUpdate => "suppliers:update" (Supplier, Update),
	SuppliersUpdateStatus => "suppliers:update-status" (Supplier, UpdateStatus),
	SuppliersDelete => "suppliers:delete" (Supplier, Delete),

	StoresList => "stores:list" (Store, List),
	StoresGetById => "stores:get-by-id" (Store, GetById),
	StoresCreate => "stores:create" (Store, Create),
	StoresUpdate => "stores:update" (Store, Update),
	StoresDelete => "stores:delete" (Store, Delete),

	ApprovalRequestsList => "approval-requests:list" (ApprovalRequest, List),
	ApprovalRequestsView => "approval-requests:view" (ApprovalRequest, View),
	ApprovalRequestsCreate => "approval-requests:create" (ApprovalRequest, Create),
	ApprovalRequestsApprove => "approval-requests:approve" (ApprovalRequest, Approve),
	ApprovalRequestsReject => "approval-requests:reject" (ApprovalRequest, Reject),

	EmployeesList => "employees:list" (Employee, List),
	EmployeesGetById => "employees:get-by-id" (Employee, GetById),
	EmployeesCreate => "employees:create" (Employee, Create),
	EmployeesUpdate => "employees:update" (Employee, Update),
	EmployeesDelete => "employees:delete" (Employee, Delete),

	RolesList => "roles:list" (Role, List),
	RolesCreate => "roles:create" (Role, Create),
	RolesUpdate => "roles:update" (Role, Update),
	RolesDelete => "roles:delete" (Role, Delete),
	RolesAssign => "roles:assign" (Role, Assign),

	OrgUnitsList => "org-units:list" (OrgUnit, List),
	OrgUnitsCreate => "org-units:create" (OrgUnit, Create),
	OrgUnitsUpdate => "org-units:update" (OrgUnit, Update),
	OrgUnitsDelete => "org-units:delete" (OrgUnit, Delete),

	PurchaseOrdersList => "purchase-orders:list" (PurchaseOrder, List),
	PurchaseOrdersGetById => "purchase-orders:get-by-id" (PurchaseOrder, GetById),
	PurchaseOrdersCreate => "purchase-orders:create" (PurchaseOrder, Create),
	PurchaseOrdersUpdate => "purchase-orders:update" (PurchaseOrder, Update),
	PurchaseOrdersApprove => "purchase-orders:approve" (PurchaseOrder, Approve),
	PurchaseOrdersDelete => "purchase-orders:delete" (PurchaseOrder, Delete),
}

impl Permission {
	/// Finds the catalog entry for a resource type and action, if one exists.
	pub fn lookup(resource_type: ResourceType, action: Action) -> Option<Permission> {
		Permission::ALL
			.iter()
			.copied()
			.find(|p| p.resource_type() == resource_type && p.action() == action)
	}
}

impl fmt::Display for Permission {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Permission {
	type Err = UnknownPermission;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Permission::ALL
			.iter()
			.copied()
			.find(|p| p.as_str() == s)
			.ok_or_else(|| UnknownPermission(s.to_string()))
	}
}

impl Serialize for Permission {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(self.as_str())
	}
}

impl<'de> Deserialize<'de> for Permission {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let token = String::deserialize(deserializer)?;
		token.parse().map_err(serde::de::Error::custom)
	}
}
