// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use super::roles;
use crate::abac::registry::PolicyTableBuilder;
use crate::abac::rule::RoleRule;
use crate::error::PredicateError;
use crate::types::{Action, ResourceType, SubjectKind};

const SUPPLIER: ResourceType = ResourceType::Supplier;

pub(super) fn register(builder: PolicyTableBuilder) -> PolicyTableBuilder {
	builder
		.rules(SUPPLIER, roles::ADMIN, Action::all(), RoleRule::allow())
		.rules(
			SUPPLIER,
			roles::OWNER,
			&[Action::View, Action::Update],
			RoleRule::when_resource("owner_is_subject", |subject, resource| {
				Ok(resource.require_str("owner_id")? == subject.id.to_string())
			}),
		)
		.rules(
			SUPPLIER,
			roles::PROCUREMENT,
			&[Action::View, Action::List],
			RoleRule::allow(),
		)
		.rule(
			SUPPLIER,
			roles::PROCUREMENT,
			Action::UpdateStatus,
			RoleRule::when_resource("supplier_in_subject_org_unit", |subject, resource| {
				let org_unit = resource.require_str("org_unit_id")?;
				let Some(own) = subject.org_unit_id else {
					return Err(PredicateError::Other("subject has no org unit".into()));
				};
				Ok(org_unit == own.to_string())
			}),
		)
		.rules(
			SUPPLIER,
			roles::SUPPLIER_CONTACT,
			&[Action::View, Action::Update],
			RoleRule::when_resource("contact_of_supplier", |subject, resource| {
				if subject.kind != SubjectKind::Supplier {
					return Ok(false);
				}
				Ok(resource.require_str("supplier_id")? == subject.id.to_string())
			}),
		)
}

#[cfg(test)]
mod tests {
	use crate::abac::{default_policies, evaluate};
	use crate::attributes::ResourceAttributes;
	use crate::decision::DecisionReason;
	use crate::subject::Subject;
	use crate::types::{Action, OrgUnitId, ResourceType, RoleId, SubjectId, SubjectKind};

	fn check(subject: &Subject, action: Action, resource: &ResourceAttributes) -> bool {
		evaluate(
			&default_policies(),
			subject,
			action,
			ResourceType::Supplier,
			Some(resource),
			None,
			None,
		)
		.granted
	}

	#[test]
	fn owner_updates_own_supplier_only() {
		let owner = Subject::new(SubjectId::generate(), SubjectKind::Employee).with_role("owner");
		let own = ResourceAttributes::new().with("owner_id", owner.id.to_string());
		let foreign = ResourceAttributes::new().with("owner_id", SubjectId::generate().to_string());

		assert!(check(&owner, Action::Update, &own));
		assert!(!check(&owner, Action::Update, &foreign));
		assert!(!check(&owner, Action::Delete, &own));
	}

	#[test]
	fn procurement_status_change_is_org_unit_scoped() {
		let unit = OrgUnitId::generate();
		let buyer = Subject::new(SubjectId::generate(), SubjectKind::Employee)
			.in_org_unit(unit)
			.with_role("procurement");
		let same = ResourceAttributes::new().with("org_unit_id", unit.to_string());
		let other = ResourceAttributes::new().with("org_unit_id", OrgUnitId::generate().to_string());

		assert!(check(&buyer, Action::UpdateStatus, &same));
		assert!(!check(&buyer, Action::UpdateStatus, &other));
		assert!(check(&buyer, Action::List, &other));
	}

	#[test]
	fn procurement_without_org_unit_abstains() {
		let buyer = Subject::new(SubjectId::generate(), SubjectKind::Employee).with_role("procurement");
		let resource = ResourceAttributes::new().with("org_unit_id", OrgUnitId::generate().to_string());
		assert!(!check(&buyer, Action::UpdateStatus, &resource));
	}

	#[test]
	fn supplier_contact_must_be_a_supplier_account() {
		let id = SubjectId::generate();
		let resource = ResourceAttributes::new().with("supplier_id", id.to_string());
		let contact = Subject::new(id, SubjectKind::Supplier).with_role("supplier-contact");
		let impostor = Subject::new(id, SubjectKind::Employee).with_role("supplier-contact");

		assert!(check(&contact, Action::Update, &resource));
		assert!(!check(&impostor, Action::Update, &resource));
	}

	#[test]
	fn admin_grants_every_action() {
		let admin = Subject::new(SubjectId::generate(), SubjectKind::Admin).with_role("admin");
		for action in Action::all() {
			let result = evaluate(
				&default_policies(),
				&admin,
				*action,
				ResourceType::Supplier,
				None,
				None,
				None,
			);
			assert_eq!(
				result.reason,
				DecisionReason::UnconditionalGrant {
					role: RoleId::from("admin")
				}
			);
		}
	}
}
