// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! ABAC policy evaluation.
//!
//! [`evaluate`] walks the subject's roles in order and returns on the first role
//! that grants. This is a union-of-grants model:
//!
//! 1. No roles: deny ("no roles")
//! 2. No rules for the resource type: deny ("no policy for resource type")
//! 3. Per role: a missing rule or `Constant(false)` abstains; `Constant(true)`
//!    grants; a predicate grants when it returns `Ok(true)` and abstains on
//!    `Ok(false)`, `Err` or panic
//! 4. Nobody granted: deny, listing the roles considered
//!
//! There is no veto: a role cannot override another role's grant. Evaluation is
//! synchronous and works on the subject snapshot and policy snapshot it is given.

use tracing::instrument;

use super::registry::PolicyTable;
use super::rule::RoleRule;
use crate::attributes::{ContextAttributes, ResourceAttributes};
use crate::decision::{AccessControlResult, DecisionReason};
use crate::error::AuthzError;
use crate::metrics::AuthzMetrics;
use crate::subject::Subject;
use crate::types::{Action, ResourceType};

/// Evaluates the policy table for one request.
///
/// `metrics` receives a predicate-failure sample for every rule that errors.
#[instrument(
	level = "debug",
	skip(table, subject, resource, context, metrics),
	fields(
		subject_id = %subject.id,
		resource_type = %resource_type,
		action = %action,
	)
)]
pub fn evaluate(
	table: &PolicyTable,
	subject: &Subject,
	action: Action,
	resource_type: ResourceType,
	resource: Option<&ResourceAttributes>,
	context: Option<&ContextAttributes>,
	metrics: Option<&AuthzMetrics>,
) -> AccessControlResult {
	if subject.roles.is_empty() {
		return AccessControlResult::deny(resource_type, action, DecisionReason::NoRoles);
	}

	if !table.has_policies(resource_type) {
		let err = AuthzError::UnknownResourceType(resource_type);
		tracing::warn!(error = %err, "ABAC check on resource type without policy entries");
		return AccessControlResult::deny(resource_type, action, DecisionReason::NoPolicy);
	}

	for role in &subject.roles {
		let Some(rule) = table.rule(resource_type, role, action) else {
			continue;
		};

		match rule {
			RoleRule::Constant(true) => {
				return AccessControlResult::grant(
					resource_type,
					action,
					DecisionReason::UnconditionalGrant { role: role.clone() },
				);
			}
			RoleRule::Constant(false) => continue,
			RoleRule::Predicate(predicate) => match predicate.call(subject, resource, context) {
				Ok(true) => {
					return AccessControlResult::grant(
						resource_type,
						action,
						DecisionReason::ConditionalGrant {
							role: role.clone(),
							predicate: predicate.name(),
						},
					);
				}
				Ok(false) => continue,
				Err(source) => {
					let err = AuthzError::PredicateEvaluation {
						role: role.clone(),
						source,
					};
					tracing::warn!(
						role = %role,
						predicate = predicate.name(),
						error = %err,
						request_id = context.and_then(|c| c.request_id.as_deref()),
						"policy predicate failed; role abstains"
					);
					if let Some(metrics) = metrics {
						metrics.record_predicate_failure(resource_type, role);
					}
				}
			},
		}
	}

	AccessControlResult::deny(
		resource_type,
		action,
		DecisionReason::NoRoleGranted {
			roles: subject.roles.clone(),
		},
	)
}
