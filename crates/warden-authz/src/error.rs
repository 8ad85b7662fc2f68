// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error taxonomy of the decision engine.
//!
//! None of these escape the [`AuthorizationGate`](crate::AuthorizationGate): every
//! variant is recovered into a denial. They exist so failures can be logged and
//! counted with full detail on the server side.

use crate::types::{ResourceType, RoleId, SubjectId};

/// Storage failure while resolving subject, role or permission data.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
	#[error("storage unavailable: {0}")]
	Unavailable(String),

	#[error("query failed: {0}")]
	Query(String),

	#[error("corrupt record: {0}")]
	Corrupt(String),
}

/// Failure of a single role's conditional rule.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PredicateError {
	#[error("missing attribute `{0}`")]
	MissingAttribute(String),

	#[error("attribute `{key}` is not a {expected}")]
	InvalidAttribute { key: String, expected: &'static str },

	#[error("resource attributes required")]
	MissingResource,

	#[error("predicate panicked: {0}")]
	Panicked(String),

	#[error("{0}")]
	Other(String),
}

#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
	#[error(transparent)]
	Repository(#[from] RepositoryError),

	#[error("no policy registered for resource type `{0}`")]
	UnknownResourceType(ResourceType),

	#[error("rule for role `{role}` failed: {source}")]
	PredicateEvaluation {
		role: RoleId,
		#[source]
		source: PredicateError,
	},

	#[error("subject `{0}` not found")]
	SubjectNotFound(SubjectId),

	#[error("permission `{0}` is not in the catalog")]
	UnknownPermission(String),
}

pub type Result<T> = std::result::Result<T, AuthzError>;
