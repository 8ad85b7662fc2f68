// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! `warden` operator binary.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;
use warden_authz::{
	default_policies, AccessControlResult, Action, AuthorizationGate, AuthzMetrics,
	ContextAttributes, DecisionLogging, Permission, PolicyRegistry, ResourceAttributes,
	ResourceType, SubjectId, CATALOG_VERSION,
};
use warden_authz_db::{create_pool, run_migrations, SqlitePermissionRepository};
use warden_config::{LogFormat, WardenConfig};

/// Exit status of a `check` that was denied.
const EXIT_DENIED: u8 = 3;

#[derive(Parser, Debug)]
#[command(name = "warden", about = "Authorization decision engine", version)]
struct Args {
	/// Config file used in place of /etc/warden/warden.toml
	#[arg(long, global = true, env = "WARDEN_CONFIG")]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Print the permission catalog
	Catalog {
		#[arg(long)]
		json: bool,
	},
	/// Print the access model and role rules of every resource type
	Policies,
	/// Apply pending schema migrations
	Migrate,
	/// Ask for a decision
	Check {
		/// Print prometheus metrics to stderr after the decision
		#[arg(long, global = true)]
		print_metrics: bool,

		#[command(subcommand)]
		query: CheckQuery,
	},
}

#[derive(Subcommand, Debug)]
enum CheckQuery {
	/// RBAC check of a catalog permission, e.g. `stores:list`
	Permission {
		#[arg(long)]
		subject: Uuid,
		permission: String,
	},
	/// ABAC check against the role policies
	Policy {
		#[command(flatten)]
		target: Target,
	},
	/// Check through whichever model the resource type is registered under
	Access {
		#[command(flatten)]
		target: Target,
	},
}

#[derive(clap::Args, Debug)]
struct Target {
	#[arg(long)]
	subject: Uuid,
	#[arg(long)]
	resource_type: ResourceType,
	#[arg(long)]
	action: Action,
	/// Resource attribute as key=value; values that parse as JSON keep their type
	#[arg(long = "attr", value_parser = parse_attr)]
	attrs: Vec<(String, Value)>,
	#[arg(long)]
	request_id: Option<String>,
}

impl Target {
	fn resource(&self) -> Option<ResourceAttributes> {
		if self.attrs.is_empty() {
			return None;
		}
		let mut resource = ResourceAttributes::new();
		for (key, value) in &self.attrs {
			resource.insert(key.clone(), value.clone());
		}
		Some(resource)
	}

	fn context(&self) -> ContextAttributes {
		let context = ContextAttributes::new();
		match &self.request_id {
			Some(id) => context.with_request_id(id.clone()),
			None => context,
		}
	}
}

fn parse_attr(raw: &str) -> Result<(String, Value), String> {
	let (key, value) = raw
		.split_once('=')
		.ok_or_else(|| format!("expected key=value, got `{raw}`"))?;
	let key = key.trim();
	if key.is_empty() {
		return Err(format!("empty attribute key in `{raw}`"));
	}
	let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
	Ok((key.to_string(), value))
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
	let args = Args::parse();

	let config = match &args.config {
		Some(path) => warden_config::load_config_with_file(path),
		None => warden_config::load_config(),
	}
	.context("loading configuration")?;

	init_tracing(&config);

	match args.command {
		Command::Catalog { json } => {
			print_catalog(json)?;
			Ok(ExitCode::SUCCESS)
		}
		Command::Policies => {
			print_policies(&PolicyRegistry::new(default_policies()));
			Ok(ExitCode::SUCCESS)
		}
		Command::Migrate => {
			let pool = create_pool(&config.database.url, config.database.max_connections).await?;
			let applied = run_migrations(&pool).await?;
			tracing::info!(applied, database = %config.database.url, "migrations complete");
			Ok(ExitCode::SUCCESS)
		}
		Command::Check {
			print_metrics,
			query,
		} => check(&config, query, print_metrics).await,
	}
}

fn init_tracing(config: &WardenConfig) {
	let filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| config.logging.level.clone().into());
	let registry = tracing_subscriber::registry().with(filter);

	// Decisions go to stdout; logs stay on stderr.
	match config.logging.format {
		LogFormat::Json => registry
			.with(
				tracing_subscriber::fmt::layer()
					.json()
					.with_writer(std::io::stderr),
			)
			.init(),
		LogFormat::Pretty => registry
			.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
			.init(),
	}
}

fn print_catalog(json: bool) -> anyhow::Result<()> {
	if json {
		let permissions: Vec<_> = Permission::ALL
			.iter()
			.map(|p| {
				serde_json::json!({
					"permission": p.as_str(),
					"resource_type": p.resource_type(),
					"action": p.action(),
				})
			})
			.collect();
		let doc = serde_json::json!({
			"version": CATALOG_VERSION,
			"permissions": permissions,
		});
		println!("{}", serde_json::to_string_pretty(&doc)?);
	} else {
		println!("catalog version {CATALOG_VERSION}");
		for permission in Permission::ALL {
			println!("{permission}");
		}
	}
	Ok(())
}

fn print_policies(registry: &PolicyRegistry) {
	let table = registry.snapshot();
	for resource_type in table.resource_types() {
		let model = table
			.model(resource_type)
			.map(|m| m.to_string())
			.unwrap_or_else(|| "none".to_string());
		println!("{resource_type} ({model})");
		for (role, action, rule) in table.rules_for(resource_type) {
			println!("  {:<20} {:<15} {rule}", role.as_str(), action.as_str());
		}
	}
}

async fn check(
	config: &WardenConfig,
	query: CheckQuery,
	print_metrics: bool,
) -> anyhow::Result<ExitCode> {
	let pool = create_pool(&config.database.url, config.database.max_connections)
		.await
		.with_context(|| format!("opening {}", config.database.url))?;

	let mut gate = AuthorizationGate::new(
		Arc::new(SqlitePermissionRepository::new(pool)),
		Arc::new(PolicyRegistry::new(default_policies())),
	)
	.with_decision_logging(DecisionLogging {
		log_grants: config.authz.log_grants,
		log_denials: config.authz.log_denials,
	});

	let metrics = config.authz.metrics_enabled.then(|| Arc::new(AuthzMetrics::new()));
	if let Some(metrics) = &metrics {
		gate = gate.with_metrics(Arc::clone(metrics));
	}

	let result = run_query(&gate, query).await;
	println!("{}", serde_json::to_string_pretty(&result)?);

	if print_metrics {
		match &metrics {
			Some(metrics) => eprint!("{}", metrics.encode()),
			None => tracing::warn!("metrics are disabled in configuration"),
		}
	}

	Ok(if result.granted {
		ExitCode::SUCCESS
	} else {
		ExitCode::from(EXIT_DENIED)
	})
}

async fn run_query(gate: &AuthorizationGate, query: CheckQuery) -> AccessControlResult {
	match query {
		CheckQuery::Permission {
			subject,
			permission,
		} => {
			gate.authorize_by_permission_str(SubjectId::new(subject), &permission)
				.await
		}
		CheckQuery::Policy { target } => {
			let resource = target.resource();
			let context = target.context();
			gate.authorize_by_policy(
				SubjectId::new(target.subject),
				target.resource_type,
				target.action,
				resource.as_ref(),
				Some(&context),
			)
			.await
		}
		CheckQuery::Access { target } => {
			let resource = target.resource();
			let context = target.context();
			gate.authorize(
				SubjectId::new(target.subject),
				target.resource_type,
				target.action,
				resource.as_ref(),
				Some(&context),
			)
			.await
		}
	}
}
