// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Resource and request attributes consumed by policy predicates.
//!
//! The engine never loads resources itself. Callers materialize a
//! [`ResourceAttributes`] snapshot (owning org unit, status, owner, ...) before
//! asking for a decision, and may attach request-scoped [`ContextAttributes`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::net::IpAddr;

use crate::error::PredicateError;

/// Snapshot of a resource's attributes, keyed by attribute name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceAttributes {
	attrs: Map<String, Value>,
}

impl ResourceAttributes {
	pub fn new() -> Self {
		Self::default()
	}

	/// Builder: set an attribute.
	pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.attrs.insert(key.into(), value.into());
		self
	}

	pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
		self.attrs.insert(key.into(), value.into());
	}

	pub fn get(&self, key: &str) -> Option<&Value> {
		self.attrs.get(key)
	}

	pub fn get_str(&self, key: &str) -> Option<&str> {
		self.attrs.get(key).and_then(Value::as_str)
	}

	pub fn get_bool(&self, key: &str) -> Option<bool> {
		self.attrs.get(key).and_then(Value::as_bool)
	}

	pub fn get_i64(&self, key: &str) -> Option<i64> {
		self.attrs.get(key).and_then(Value::as_i64)
	}

	/// Returns a string attribute or a [`PredicateError`] when it is absent or not a
	/// string. Predicates use this so malformed snapshots abstain instead of granting.
	pub fn require_str(&self, key: &str) -> Result<&str, PredicateError> {
		match self.attrs.get(key) {
			Some(Value::String(s)) => Ok(s.as_str()),
			Some(_) => Err(PredicateError::InvalidAttribute {
				key: key.to_string(),
				expected: "string",
			}),
			None => Err(PredicateError::MissingAttribute(key.to_string())),
		}
	}

	pub fn len(&self) -> usize {
		self.attrs.len()
	}

	pub fn is_empty(&self) -> bool {
		self.attrs.is_empty()
	}
}

impl From<Map<String, Value>> for ResourceAttributes {
	fn from(attrs: Map<String, Value>) -> Self {
		Self { attrs }
	}
}

/// Request-scoped situational data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextAttributes {
	pub request_id: Option<String>,
	pub ip: Option<IpAddr>,
	pub at: Option<DateTime<Utc>>,
	#[serde(default)]
	pub extra: Map<String, Value>,
}

impl ContextAttributes {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
		self.request_id = Some(request_id.into());
		self
	}

	pub fn with_ip(mut self, ip: IpAddr) -> Self {
		self.ip = Some(ip);
		self
	}

	pub fn with_time(mut self, at: DateTime<Utc>) -> Self {
		self.at = Some(at);
		self
	}

	pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.extra.insert(key.into(), value.into());
		self
	}
}
