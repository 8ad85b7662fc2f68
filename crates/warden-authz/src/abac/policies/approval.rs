// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use super::roles;
use crate::abac::registry::PolicyTableBuilder;
use crate::abac::rule::RoleRule;
use crate::types::{Action, ResourceType};

const APPROVAL_REQUEST: ResourceType = ResourceType::ApprovalRequest;

/// Status an approval request must be in to be approved or rejected.
pub const PENDING: &str = "pending";

pub(super) fn register(builder: PolicyTableBuilder) -> PolicyTableBuilder {
	builder
		.rules(APPROVAL_REQUEST, roles::ADMIN, Action::all(), RoleRule::allow())
		.rule(APPROVAL_REQUEST, roles::REQUESTER, Action::Create, RoleRule::allow())
		.rule(
			APPROVAL_REQUEST,
			roles::REQUESTER,
			Action::View,
			RoleRule::when_resource("requester_is_subject", |subject, resource| {
				Ok(resource.require_str("requester_id")? == subject.id.to_string())
			}),
		)
		.rule(APPROVAL_REQUEST, roles::APPROVER, Action::View, RoleRule::allow())
		.rules(
			APPROVAL_REQUEST,
			roles::APPROVER,
			&[Action::Approve, Action::Reject],
			// No self-approval.
			RoleRule::when_resource("pending_and_not_requester", |subject, resource| {
				let status = resource.require_str("status")?;
				let requester = resource.require_str("requester_id")?;
				Ok(status == PENDING && requester != subject.id.to_string())
			}),
		)
}
