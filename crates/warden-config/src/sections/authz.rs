// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authorization gate settings.

use serde::Deserialize;

/// Controls decision logging and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthzConfig {
	/// Log grants at `info` (otherwise `debug`).
	pub log_grants: bool,
	/// Log denials at `info` (otherwise `debug`).
	pub log_denials: bool,
	pub metrics_enabled: bool,
}

impl Default for AuthzConfig {
	fn default() -> Self {
		Self {
			log_grants: false,
			log_denials: true,
			metrics_enabled: true,
		}
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthzConfigLayer {
	#[serde(default)]
	pub log_grants: Option<bool>,
	#[serde(default)]
	pub log_denials: Option<bool>,
	#[serde(default)]
	pub metrics_enabled: Option<bool>,
}

impl AuthzConfigLayer {
	pub fn merge(&mut self, other: AuthzConfigLayer) {
		if other.log_grants.is_some() {
			self.log_grants = other.log_grants;
		}
		if other.log_denials.is_some() {
			self.log_denials = other.log_denials;
		}
		if other.metrics_enabled.is_some() {
			self.metrics_enabled = other.metrics_enabled;
		}
	}

	pub fn finalize(self) -> AuthzConfig {
		let defaults = AuthzConfig::default();
		AuthzConfig {
			log_grants: self.log_grants.unwrap_or(defaults.log_grants),
			log_denials: self.log_denials.unwrap_or(defaults.log_denials),
			metrics_enabled: self.metrics_enabled.unwrap_or(defaults.metrics_enabled),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_log_denials_only() {
		let config = AuthzConfigLayer::default().finalize();
		assert!(!config.log_grants);
		assert!(config.log_denials);
		assert!(config.metrics_enabled);
	}

	#[test]
	fn later_layer_wins_per_field() {
		let mut base = AuthzConfigLayer {
			log_grants: Some(true),
			log_denials: Some(false),
			metrics_enabled: None,
		};
		base.merge(AuthzConfigLayer {
			log_grants: None,
			log_denials: Some(true),
			metrics_enabled: Some(false),
		});
		let config = base.finalize();
		assert!(config.log_grants);
		assert!(config.log_denials);
		assert!(!config.metrics_enabled);
	}
}
