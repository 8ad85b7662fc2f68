// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Schema migrations.
//!
//! Migrations are embedded SQL files applied in version order. Each one runs in
//! its own transaction together with its row in `schema_migrations`, so a
//! failed migration leaves no partial schema behind.

use chrono::Utc;
use sqlx::sqlite::SqlitePool;

use crate::error::DbError;

struct Migration {
	version: i64,
	name: &'static str,
	sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
	version: 1,
	name: "authz_schema",
	sql: include_str!("../migrations/001_authz_schema.sql"),
}];

/// Applies pending migrations. Returns how many were applied.
#[tracing::instrument(skip(pool))]
pub async fn run_migrations(pool: &SqlitePool) -> Result<usize, DbError> {
	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS schema_migrations (
			version INTEGER PRIMARY KEY NOT NULL,
			name TEXT NOT NULL,
			applied_at TEXT NOT NULL
		)
		"#,
	)
	.execute(pool)
	.await?;

	let applied: Vec<i64> = sqlx::query_scalar("SELECT version FROM schema_migrations")
		.fetch_all(pool)
		.await?;

	let mut count = 0;
	for migration in MIGRATIONS {
		if applied.contains(&migration.version) {
			continue;
		}

		let mut tx = pool.begin().await?;
		sqlx::raw_sql(migration.sql).execute(&mut *tx).await?;
		sqlx::query("INSERT INTO schema_migrations (version, name, applied_at) VALUES (?, ?, ?)")
			.bind(migration.version)
			.bind(migration.name)
			.bind(Utc::now().to_rfc3339())
			.execute(&mut *tx)
			.await?;
		tx.commit().await?;

		tracing::info!(
			version = migration.version,
			name = migration.name,
			"applied migration"
		);
		count += 1;
	}

	Ok(count)
}
