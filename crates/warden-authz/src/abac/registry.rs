// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The policy registry.
//!
//! A [`PolicyTable`] is plain configuration data: which access model governs each
//! resource type, and for ABAC types, `resource type -> role -> action -> rule`.
//! Adding a resource type means adding entries, not new branches in the engine.
//!
//! [`PolicyRegistry`] owns the current table behind an [`ArcSwap`]. Readers take a
//! snapshot once per decision; writers publish a complete new table. A reader
//! therefore sees either the old table or the new one, never a mix.

use arc_swap::ArcSwap;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use super::rule::RoleRule;
use crate::types::{Action, ResourceType, RoleId};

/// The authorization model that governs a resource type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessModel {
	/// Flat permission-token check.
	Rbac,
	/// Per-role policy rules over resource and context attributes.
	Abac,
}

impl fmt::Display for AccessModel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			AccessModel::Rbac => f.write_str("rbac"),
			AccessModel::Abac => f.write_str("abac"),
		}
	}
}

type RoleActions = HashMap<Action, RoleRule>;

/// Immutable policy configuration.
#[derive(Debug, Clone, Default)]
pub struct PolicyTable {
	models: HashMap<ResourceType, AccessModel>,
	policies: HashMap<ResourceType, HashMap<RoleId, RoleActions>>,
}

impl PolicyTable {
	pub fn builder() -> PolicyTableBuilder {
		PolicyTableBuilder::default()
	}

	/// Starts a builder pre-populated with this table's contents.
	pub fn to_builder(&self) -> PolicyTableBuilder {
		PolicyTableBuilder {
			table: self.clone(),
		}
	}

	pub fn model(&self, resource_type: ResourceType) -> Option<AccessModel> {
		self.models.get(&resource_type).copied()
	}

	/// True when at least one rule exists for the resource type.
	pub fn has_policies(&self, resource_type: ResourceType) -> bool {
		self
			.policies
			.get(&resource_type)
			.map(|roles| roles.values().any(|actions| !actions.is_empty()))
			.unwrap_or(false)
	}

	/// Looks up a rule. `None` means the role is silent (abstains).
	pub fn rule(&self, resource_type: ResourceType, role: &RoleId, action: Action) -> Option<&RoleRule> {
		self.policies.get(&resource_type)?.get(role)?.get(&action)
	}

	/// Resource types with a registered model, sorted.
	pub fn resource_types(&self) -> Vec<ResourceType> {
		let mut types: Vec<_> = self.models.keys().copied().collect();
		types.sort();
		types
	}

	/// Flattened, sorted view of the rules for one resource type.
	pub fn rules_for(&self, resource_type: ResourceType) -> Vec<(RoleId, Action, String)> {
		let Some(roles) = self.policies.get(&resource_type) else {
			return Vec::new();
		};
		let mut sorted: BTreeMap<(RoleId, Action), String> = BTreeMap::new();
		for (role, actions) in roles {
			for (action, rule) in actions {
				sorted.insert((role.clone(), *action), rule.describe());
			}
		}
		sorted
			.into_iter()
			.map(|((role, action), rule)| (role, action, rule))
			.collect()
	}
}

/// Builder for [`PolicyTable`].
#[derive(Debug, Default)]
pub struct PolicyTableBuilder {
	table: PolicyTable,
}

impl PolicyTableBuilder {
	/// Registers a resource type as RBAC-governed.
	pub fn rbac(mut self, resource_type: ResourceType) -> Self {
		self.table.models.insert(resource_type, AccessModel::Rbac);
		self.table.policies.remove(&resource_type);
		self
	}

	/// Registers a resource type as ABAC-governed.
	pub fn abac(mut self, resource_type: ResourceType) -> Self {
		self.table.models.insert(resource_type, AccessModel::Abac);
		self
	}

	/// Adds (or replaces) a rule. Also registers the resource type as ABAC,
	/// since a type is governed by exactly one model.
	pub fn rule(
		mut self,
		resource_type: ResourceType,
		role: impl Into<RoleId>,
		action: Action,
		rule: RoleRule,
	) -> Self {
		self.table.models.insert(resource_type, AccessModel::Abac);
		self
			.table
			.policies
			.entry(resource_type)
			.or_default()
			.entry(role.into())
			.or_default()
			.insert(action, rule);
		self
	}

	/// Adds the same rule for several actions.
	pub fn rules(
		mut self,
		resource_type: ResourceType,
		role: impl Into<RoleId>,
		actions: &[Action],
		rule: RoleRule,
	) -> Self {
		let role = role.into();
		for action in actions {
			self = self.rule(resource_type, role.clone(), *action, rule.clone());
		}
		self
	}

	/// Removes every rule of a role for a resource type.
	pub fn remove_role(mut self, resource_type: ResourceType, role: &RoleId) -> Self {
		if let Some(roles) = self.table.policies.get_mut(&resource_type) {
			roles.remove(role);
		}
		self
	}

	/// Unregisters a resource type entirely.
	pub fn remove_resource_type(mut self, resource_type: ResourceType) -> Self {
		self.table.models.remove(&resource_type);
		self.table.policies.remove(&resource_type);
		self
	}

	pub fn build(self) -> PolicyTable {
		self.table
	}
}

/// Atomically swappable holder of the current [`PolicyTable`].
pub struct PolicyRegistry {
	current: ArcSwap<PolicyTable>,
}

impl PolicyRegistry {
	pub fn new(table: PolicyTable) -> Self {
		Self {
			current: ArcSwap::from_pointee(table),
		}
	}

	/// A consistent view of the table. Hold it for the whole decision.
	pub fn snapshot(&self) -> Arc<PolicyTable> {
		self.current.load_full()
	}

	/// Publishes a new table; returns the previous one.
	pub fn replace(&self, table: PolicyTable) -> Arc<PolicyTable> {
		let previous = self.current.swap(Arc::new(table));
		tracing::info!("policy registry replaced");
		previous
	}

	/// Copy-on-write update: `edit` receives a builder seeded with the current
	/// table; the result is published in one swap. Concurrent updates are
	/// serialized by retrying `edit` on the latest table.
	pub fn update<F>(&self, edit: F)
	where
		F: Fn(PolicyTableBuilder) -> PolicyTableBuilder,
	{
		self
			.current
			.rcu(|current| Arc::new(edit(current.to_builder()).build()));
		tracing::info!("policy registry updated");
	}
}

impl Default for PolicyRegistry {
	fn default() -> Self {
		Self::new(PolicyTable::default())
	}
}

impl fmt::Debug for PolicyRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("PolicyRegistry")
			.field("resource_types", &self.snapshot().resource_types())
			.finish()
	}
}
