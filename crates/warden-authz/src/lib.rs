// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authorization decision engine.
//!
//! Answers one question for every privileged operation: may this subject perform
//! this action on this resource? Two models are combined:
//!
//! - **RBAC**: flat `"<namespace>:<action>"` permission tokens from a closed
//!   catalog, granted directly or through roles
//! - **ABAC**: per-role rules over resource and context attributes, evaluated
//!   first-grant-wins in the subject's role order
//!
//! Each resource type is governed by exactly one model, declared in the
//! [`PolicyRegistry`]. The [`AuthorizationGate`] resolves the subject through a
//! [`PermissionRepository`], picks the model, and returns an
//! [`AccessControlResult`]. It denies by default and never returns an error.
//!
//! # Example
//!
//! ```
//! use warden_authz::{
//!     abac, Action, PolicyTable, ResourceAttributes, ResourceType, RoleRule, Subject,
//!     SubjectId, SubjectKind,
//! };
//!
//! let table = PolicyTable::builder()
//!     .rule(
//!         ResourceType::Supplier,
//!         "owner",
//!         Action::Update,
//!         RoleRule::when_resource("owner_is_subject", |subject, resource| {
//!             Ok(resource.require_str("owner_id")? == subject.id.to_string())
//!         }),
//!     )
//!     .build();
//!
//! let subject = Subject::new(SubjectId::generate(), SubjectKind::Employee).with_role("owner");
//! let resource = ResourceAttributes::new().with("owner_id", subject.id.to_string());
//!
//! let result = abac::evaluate(
//!     &table,
//!     &subject,
//!     Action::Update,
//!     ResourceType::Supplier,
//!     Some(&resource),
//!     None,
//!     None,
//! );
//! assert!(result.granted);
//! ```

pub mod abac;
pub mod attributes;
pub mod catalog;
pub mod decision;
pub mod error;
pub mod gate;
pub mod metrics;
pub mod rbac;
pub mod repository;
pub mod subject;
pub mod types;

pub use abac::{
	default_policies, AccessModel, NamedPredicate, PolicyRegistry, PolicyTable, PolicyTableBuilder,
	RoleRule,
};
pub use attributes::{ContextAttributes, ResourceAttributes};
pub use catalog::{Permission, UnknownPermission, CATALOG_VERSION};
pub use decision::{AccessControlResult, DecisionReason, GrantSource};
pub use error::{AuthzError, PredicateError, RepositoryError, Result};
pub use gate::{AuthorizationGate, DecisionLogging};
pub use metrics::AuthzMetrics;
pub use repository::{MemoryPermissionRepository, PermissionRepository, SubjectRecord};
pub use subject::{RolePermissions, Subject};
pub use types::{Action, OrgUnitId, ResourceType, RoleId, SubjectId, SubjectKind, UnknownTag};
