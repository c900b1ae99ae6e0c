//! Install/uninstall orchestration.
//!
//! # Responsibility
//! - Track which users a plugin instance is installed for.
//! - Route per-user install/uninstall through plugin-specific hooks.
//!
//! # Invariants
//! - A user is added to the active set only after a successful install hook.
//! - A user is removed from the active set only after a successful uninstall hook.

pub mod base;
pub mod error;
pub mod manager;
