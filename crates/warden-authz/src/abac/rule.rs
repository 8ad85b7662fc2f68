// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Role rules: the leaves of the policy registry.

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use crate::attributes::{ContextAttributes, ResourceAttributes};
use crate::error::PredicateError;
use crate::subject::Subject;

type PredicateFn = dyn Fn(&Subject, Option<&ResourceAttributes>, Option<&ContextAttributes>) -> Result<bool, PredicateError>
	+ Send
	+ Sync;

/// A side-effect-free condition over subject, resource and context.
#[derive(Clone)]
pub struct NamedPredicate {
	name: &'static str,
	check: Arc<PredicateFn>,
}

impl NamedPredicate {
	pub fn new<F>(name: &'static str, check: F) -> Self
	where
		F: Fn(&Subject, Option<&ResourceAttributes>, Option<&ContextAttributes>) -> Result<bool, PredicateError>
			+ Send
			+ Sync
			+ 'static,
	{
		Self {
			name,
			check: Arc::new(check),
		}
	}

	pub fn name(&self) -> &'static str {
		self.name
	}

	/// Runs the predicate. A panic inside the predicate is reported as
	/// [`PredicateError::Panicked`] rather than unwinding through the caller.
	pub fn call(
		&self,
		subject: &Subject,
		resource: Option<&ResourceAttributes>,
		context: Option<&ContextAttributes>,
	) -> Result<bool, PredicateError> {
		match catch_unwind(AssertUnwindSafe(|| (self.check)(subject, resource, context))) {
			Ok(outcome) => outcome,
			Err(payload) => {
				let message = payload
					.downcast_ref::<&str>()
					.map(|s| s.to_string())
					.or_else(|| payload.downcast_ref::<String>().cloned())
					.unwrap_or_else(|| "non-string panic payload".to_string());
				Err(PredicateError::Panicked(message))
			}
		}
	}
}

impl fmt::Debug for NamedPredicate {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("NamedPredicate").field(&self.name).finish()
	}
}

/// What a role says about one (resource type, action) pair.
#[derive(Debug, Clone)]
pub enum RoleRule {
	/// `true` grants unconditionally; `false` abstains.
	Constant(bool),
	Predicate(NamedPredicate),
}

impl RoleRule {
	pub fn allow() -> Self {
		RoleRule::Constant(true)
	}

	pub fn abstain() -> Self {
		RoleRule::Constant(false)
	}

	/// A conditional rule. `name` identifies the condition in logs and reasons.
	pub fn when<F>(name: &'static str, check: F) -> Self
	where
		F: Fn(&Subject, Option<&ResourceAttributes>, Option<&ContextAttributes>) -> Result<bool, PredicateError>
			+ Send
			+ Sync
			+ 'static,
	{
		RoleRule::Predicate(NamedPredicate::new(name, check))
	}

	/// A conditional rule over the resource snapshot only. Missing resource
	/// attributes are an error, so the role abstains.
	pub fn when_resource<F>(name: &'static str, check: F) -> Self
	where
		F: Fn(&Subject, &ResourceAttributes) -> Result<bool, PredicateError> + Send + Sync + 'static,
	{
		Self::when(name, move |subject, resource, _context| {
			let resource = resource.ok_or(PredicateError::MissingResource)?;
			check(subject, resource)
		})
	}

	/// Short label for listings.
	pub fn describe(&self) -> String {
		match self {
			RoleRule::Constant(true) => "allow".to_string(),
			RoleRule::Constant(false) => "abstain".to_string(),
			RoleRule::Predicate(p) => format!("when {}", p.name()),
		}
	}
}
