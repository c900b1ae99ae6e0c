//! Repository layer over the host `plugin` and `module` tables.
//!
//! # Responsibility
//! - Define the data access contract used by lifecycle hooks.
//! - Isolate SQL text and transaction handling from orchestration.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`PluginNotFound`) in addition to
//!   DB transport errors.

pub mod plugin_repo;
