// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use warden_authz::RepositoryError;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
	#[error("Database error: {0}")]
	Sqlx(#[from] sqlx::Error),

	#[error("Corrupt row: {0}")]
	Corrupt(String),

	#[error("Internal: {0}")]
	Internal(String),
}

pub type Result<T> = std::result::Result<T, DbError>;

impl From<DbError> for RepositoryError {
	fn from(err: DbError) -> Self {
		match err {
			DbError::Sqlx(
				e @ (sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)),
			) => RepositoryError::Unavailable(e.to_string()),
			DbError::Sqlx(e) => RepositoryError::Query(e.to_string()),
			DbError::Corrupt(msg) => RepositoryError::Corrupt(msg),
			DbError::Internal(msg) => RepositoryError::Query(msg),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn pool_exhaustion_is_unavailable() {
		let err: RepositoryError = DbError::Sqlx(sqlx::Error::PoolTimedOut).into();
		assert!(matches!(err, RepositoryError::Unavailable(_)));
	}

	#[test]
	fn corrupt_rows_stay_corrupt() {
		let err: RepositoryError = DbError::Corrupt("bad kind".into()).into();
		assert!(matches!(err, RepositoryError::Corrupt(m) if m == "bad kind"));
	}

	#[test]
	fn other_failures_are_query_errors() {
		let err: RepositoryError = DbError::Sqlx(sqlx::Error::RowNotFound).into();
		assert!(matches!(err, RepositoryError::Query(_)));
	}
}
