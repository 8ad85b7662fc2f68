// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Attribute-based access control.
//!
//! - [`registry`]: the policy table and its atomically swappable holder
//! - [`rule`]: role rules (constant or named predicate)
//! - [`engine`]: first-grant-wins evaluation over the subject's roles
//! - [`policies`]: the platform's default table

pub mod engine;
pub mod policies;
pub mod registry;
pub mod rule;

pub use engine::evaluate;
pub use policies::{default_policies, roles};
pub use registry::{AccessModel, PolicyRegistry, PolicyTable, PolicyTableBuilder};
pub use rule::{NamedPredicate, RoleRule};
