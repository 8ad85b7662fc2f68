// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use prometheus::{Counter, CounterVec, Encoder, Opts, Registry, TextEncoder};

use crate::abac::AccessModel;
use crate::types::{ResourceType, RoleId};

/// Prometheus metrics for authorization decisions.
///
/// Each instance owns its registry, so tests and embedders can create as many
/// as they like without colliding on the global default registry.
pub struct AuthzMetrics {
	registry: Registry,

	pub decisions: CounterVec,
	pub predicate_failures: CounterVec,
	pub repository_errors: Counter,
	pub unknown_permissions: Counter,
}

impl Default for AuthzMetrics {
	fn default() -> Self {
		Self::new()
	}
}

impl std::fmt::Debug for AuthzMetrics {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("AuthzMetrics").finish_non_exhaustive()
	}
}

impl AuthzMetrics {
	pub fn new() -> Self {
		let registry = Registry::new();

		let decisions = CounterVec::new(
			Opts::new(
				"warden_authz_decisions_total",
				"Authorization decisions by model and outcome",
			),
			&["model", "outcome"],
		)
		.unwrap();
		registry.register(Box::new(decisions.clone())).unwrap();

		let predicate_failures = CounterVec::new(
			Opts::new(
				"warden_authz_predicate_failures_total",
				"Policy predicates that errored or panicked (role abstained)",
			),
			&["resource_type", "role"],
		)
		.unwrap();
		registry
			.register(Box::new(predicate_failures.clone()))
			.unwrap();

		let repository_errors = Counter::new(
			"warden_authz_repository_errors_total",
			"Permission repository failures (decision denied)",
		)
		.unwrap();
		registry
			.register(Box::new(repository_errors.clone()))
			.unwrap();

		let unknown_permissions = Counter::new(
			"warden_authz_unknown_permissions_total",
			"Checks against permission strings outside the catalog",
		)
		.unwrap();
		registry
			.register(Box::new(unknown_permissions.clone()))
			.unwrap();

		AuthzMetrics {
			registry,
			decisions,
			predicate_failures,
			repository_errors,
			unknown_permissions,
		}
	}

	/// `model` is `None` when the decision was made before a model was selected
	/// (e.g. the subject could not be resolved).
	pub fn record_decision(&self, model: Option<AccessModel>, granted: bool) {
		let model = match model {
			Some(AccessModel::Rbac) => "rbac",
			Some(AccessModel::Abac) => "abac",
			None => "none",
		};
		self
			.decisions
			.with_label_values(&[model, if granted { "grant" } else { "deny" }])
			.inc();
	}

	pub fn record_predicate_failure(&self, resource_type: ResourceType, role: &RoleId) {
		self
			.predicate_failures
			.with_label_values(&[resource_type.as_str(), role.as_str()])
			.inc();
	}

	pub fn record_repository_error(&self) {
		self.repository_errors.inc();
	}

	pub fn record_unknown_permission(&self) {
		self.unknown_permissions.inc();
	}

	pub fn decisions(&self, model: &str, outcome: &str) -> u64 {
		self.decisions.with_label_values(&[model, outcome]).get() as u64
	}

	pub fn predicate_failures(&self, resource_type: ResourceType, role: &str) -> u64 {
		self
			.predicate_failures
			.with_label_values(&[resource_type.as_str(), role])
			.get() as u64
	}

	pub fn encode(&self) -> String {
		let encoder = TextEncoder::new();
		let metric_families = self.registry.gather();
		let mut buffer = Vec::new();
		if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
			tracing::warn!(error = %e, "failed to encode authz metrics");
			return String::new();
		}
		String::from_utf8(buffer).unwrap_or_default()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn decisions_are_labelled() {
		let metrics = AuthzMetrics::new();
		metrics.record_decision(Some(AccessModel::Rbac), true);
		metrics.record_decision(Some(AccessModel::Abac), false);
		metrics.record_decision(None, false);

		assert_eq!(metrics.decisions("rbac", "grant"), 1);
		assert_eq!(metrics.decisions("abac", "deny"), 1);
		assert_eq!(metrics.decisions("none", "deny"), 1);
		assert_eq!(metrics.decisions("rbac", "deny"), 0);
	}

	#[test]
	fn encode_includes_counters() {
		let metrics = AuthzMetrics::new();
		metrics.record_repository_error();
		metrics.record_unknown_permission();
		metrics.record_predicate_failure(ResourceType::Supplier, &RoleId::from("owner"));

		let text = metrics.encode();
		assert!(text.contains("warden_authz_repository_errors_total 1"));
		assert!(text.contains("warden_authz_unknown_permissions_total 1"));
		assert!(text.contains("warden_authz_predicate_failures_total{resource_type=\"supplier\",role=\"owner\"} 1"));
	}

	#[test]
	fn instances_do_not_share_state() {
		let a = AuthzMetrics::new();
		let b = AuthzMetrics::new();
		a.record_unknown_permission();
		assert_eq!(a.unknown_permissions.get() as u64, 1);
		assert_eq!(b.unknown_permissions.get() as u64, 0);
	}
}
