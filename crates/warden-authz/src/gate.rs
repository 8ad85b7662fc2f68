// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The authorization gate: the single entry point used by route handlers.
//!
//! Each call:
//!
//! 1. Takes one snapshot of the policy registry
//! 2. Resolves the subject once through the [`PermissionRepository`]
//! 3. Delegates to the RBAC evaluator or the ABAC engine, never both
//! 4. Logs and counts the decision
//!
//! Entry points are infallible. Every failure (storage, unknown subject, unknown
//! permission, unregistered resource type) becomes a denial whose reason is
//! safe to record; storage details only reach the server-side log.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::instrument;

use crate::abac::{self, AccessModel, PolicyRegistry};
use crate::attributes::{ContextAttributes, ResourceAttributes};
use crate::catalog::Permission;
use crate::decision::{AccessControlResult, DecisionReason};
use crate::error::{AuthzError, Result};
use crate::metrics::AuthzMetrics;
use crate::rbac;
use crate::repository::PermissionRepository;
use crate::subject::{RolePermissions, Subject};
use crate::types::{Action, ResourceType, SubjectId};

/// Controls which decisions are logged at `info` (the rest go to `debug`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecisionLogging {
	pub log_grants: bool,
	pub log_denials: bool,
}

impl Default for DecisionLogging {
	fn default() -> Self {
		Self {
			log_grants: false,
			log_denials: true,
		}
	}
}

pub struct AuthorizationGate {
	repository: Arc<dyn PermissionRepository>,
	registry: Arc<PolicyRegistry>,
	metrics: Option<Arc<AuthzMetrics>>,
	logging: DecisionLogging,
}

impl AuthorizationGate {
	pub fn new(repository: Arc<dyn PermissionRepository>, registry: Arc<PolicyRegistry>) -> Self {
		Self {
			repository,
			registry,
			metrics: None,
			logging: DecisionLogging::default(),
		}
	}

	pub fn with_metrics(mut self, metrics: Arc<AuthzMetrics>) -> Self {
		self.metrics = Some(metrics);
		self
	}

	pub fn with_decision_logging(mut self, logging: DecisionLogging) -> Self {
		self.logging = logging;
		self
	}

	pub fn registry(&self) -> &Arc<PolicyRegistry> {
		&self.registry
	}

	/// Decides using whichever model the resource type is registered under.
	#[instrument(
		skip(self, resource, context),
		fields(
			subject_id = %subject_id,
			resource_type = %resource_type,
			action = %action,
			request_id = context.and_then(|c| c.request_id.as_deref()),
		)
	)]
	pub async fn authorize(
		&self,
		subject_id: SubjectId,
		resource_type: ResourceType,
		action: Action,
		resource: Option<&ResourceAttributes>,
		context: Option<&ContextAttributes>,
	) -> AccessControlResult {
		let table = self.registry.snapshot();
		let model = table.model(resource_type);

		let (subject, role_permissions) = match self
			.resolve(subject_id, model == Some(AccessModel::Rbac))
			.await
		{
			Ok(resolved) => resolved,
			Err(err) => {
				let result = self.unresolvable(err, resource_type.as_str(), action.as_str());
				return self.finish(model, result);
			}
		};

		let result = match model {
			None => {
				let err = AuthzError::UnknownResourceType(resource_type);
				tracing::warn!(error = %err, "resource type is not registered with any access model");
				AccessControlResult::deny(resource_type, action, DecisionReason::ModelNotRegistered)
			}
			Some(AccessModel::Rbac) => match Permission::lookup(resource_type, action) {
				Some(permission) => rbac::evaluate(&subject, &role_permissions, permission),
				None => {
					let token = format!("{}:{}", resource_type.permission_namespace(), action);
					self.unknown_permission(&token, resource_type.as_str(), action.as_str())
				}
			},
			Some(AccessModel::Abac) => abac::evaluate(
				&table,
				&subject,
				action,
				resource_type,
				resource,
				context,
				self.metrics.as_deref(),
			),
		};

		self.finish(model, result)
	}

	/// RBAC check of one catalog permission.
	#[instrument(skip(self), fields(subject_id = %subject_id, permission = %permission))]
	pub async fn authorize_by_permission(
		&self,
		subject_id: SubjectId,
		permission: Permission,
	) -> AccessControlResult {
		let result = match self.resolve(subject_id, true).await {
			Ok((subject, role_permissions)) => rbac::evaluate(&subject, &role_permissions, permission),
			Err(err) => self.unresolvable(
				err,
				permission.resource_type().as_str(),
				permission.action().as_str(),
			),
		};
		self.finish(Some(AccessModel::Rbac), result)
	}

	/// RBAC check of a permission given as a string. Strings outside the catalog
	/// are a caller bug: they deny and are logged at `error`.
	pub async fn authorize_by_permission_str(
		&self,
		subject_id: SubjectId,
		permission: &str,
	) -> AccessControlResult {
		match permission.parse::<Permission>() {
			Ok(permission) => self.authorize_by_permission(subject_id, permission).await,
			Err(_) => {
				let (namespace, action) = permission.split_once(':').unwrap_or((permission, ""));
				let result = self.unknown_permission(permission, namespace, action);
				self.finish(Some(AccessModel::Rbac), result)
			}
		}
	}

	/// ABAC check, regardless of the model the resource type is registered under.
	/// Types without policy entries deny.
	#[instrument(
		skip(self, resource, context),
		fields(
			subject_id = %subject_id,
			resource_type = %resource_type,
			action = %action,
			request_id = context.and_then(|c| c.request_id.as_deref()),
		)
	)]
	pub async fn authorize_by_policy(
		&self,
		subject_id: SubjectId,
		resource_type: ResourceType,
		action: Action,
		resource: Option<&ResourceAttributes>,
		context: Option<&ContextAttributes>,
	) -> AccessControlResult {
		let table = self.registry.snapshot();
		let result = match self.resolve(subject_id, false).await {
			Ok((subject, _)) => abac::evaluate(
				&table,
				&subject,
				action,
				resource_type,
				resource,
				context,
				self.metrics.as_deref(),
			),
			Err(err) => self.unresolvable(err, resource_type.as_str(), action.as_str()),
		};
		self.finish(Some(AccessModel::Abac), result)
	}

	/// Loads the subject snapshot for one decision. Role permissions are only
	/// fetched when the RBAC evaluator needs them.
	async fn resolve(
		&self,
		subject_id: SubjectId,
		with_role_permissions: bool,
	) -> Result<(Subject, RolePermissions)> {
		let record = self
			.repository
			.fetch_subject(subject_id)
			.await?
			.ok_or(AuthzError::SubjectNotFound(subject_id))?;

		let direct = self.repository.fetch_direct_permissions(subject_id).await?;
		let roles = self.repository.fetch_role_assignments(subject_id).await?;

		let mut role_permissions = RolePermissions::new();
		if with_role_permissions && !roles.is_empty() {
			for (role, raw) in self.repository.fetch_role_permissions(&roles).await? {
				let parsed = parse_catalog(raw, role.as_str());
				role_permissions.insert(role, parsed);
			}
		}

		let subject = Subject {
			id: record.id,
			kind: record.kind,
			org_unit_id: record.org_unit_id,
			roles,
			direct_permissions: parse_catalog(direct, "direct"),
		};

		Ok((subject, role_permissions))
	}

	fn unresolvable(&self, err: AuthzError, resource_type: &str, action: &str) -> AccessControlResult {
		match &err {
			AuthzError::Repository(_) => {
				tracing::error!(error = %err, "permission repository failed; denying");
				if let Some(metrics) = &self.metrics {
					metrics.record_repository_error();
				}
			}
			_ => tracing::warn!(error = %err, "subject could not be resolved; denying"),
		}
		AccessControlResult::deny_labels(resource_type, action, DecisionReason::SubjectNotResolvable)
	}

	fn unknown_permission(&self, token: &str, resource_type: &str, action: &str) -> AccessControlResult {
		let err = AuthzError::UnknownPermission(token.to_string());
		tracing::error!(error = %err, "permission check against a token outside the catalog");
		if let Some(metrics) = &self.metrics {
			metrics.record_unknown_permission();
		}
		AccessControlResult::deny_labels(
			resource_type,
			action,
			DecisionReason::UnknownPermission {
				permission: token.to_string(),
			},
		)
	}

	fn finish(&self, model: Option<AccessModel>, result: AccessControlResult) -> AccessControlResult {
		let loud = if result.granted {
			self.logging.log_grants
		} else {
			self.logging.log_denials
		};
		let outcome = if result.granted { "grant" } else { "deny" };

		if loud {
			tracing::info!(
				outcome,
				resource_type = %result.resource_type,
				action = %result.action,
				reason = %result.reason,
				"authorization decision"
			);
		} else {
			tracing::debug!(
				outcome,
				resource_type = %result.resource_type,
				action = %result.action,
				reason = %result.reason,
				"authorization decision"
			);
		}

		if let Some(metrics) = &self.metrics {
			metrics.record_decision(model, result.granted);
		}
		result
	}
}

impl std::fmt::Debug for AuthorizationGate {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("AuthorizationGate")
			.field("registry", &self.registry)
			.field("logging", &self.logging)
			.finish_non_exhaustive()
	}
}

/// Parses stored permission strings. Strings outside the catalog cannot be
/// granted, so they are dropped with a warning.
fn parse_catalog(raw: Vec<String>, origin: &str) -> BTreeSet<Permission> {
	raw
		.into_iter()
		.filter_map(|token| match token.parse::<Permission>() {
			Ok(permission) => Some(permission),
			Err(err) => {
				tracing::warn!(origin, error = %err, "dropping stored permission string");
				None
			}
		})
		.collect()
}
