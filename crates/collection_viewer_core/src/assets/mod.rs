//! Filesystem side of the plugin lifecycle.
//!
//! # Responsibility
//! - Copy bundled plugin files into `<base>/shared/<slug>/v<version>/`.
//! - Validate and health-check an installed bundle directory.
//!
//! # Invariants
//! - Copying is not transactional; a failure can leave partial files.
//! - Validation and health checks never mutate the directory.

pub mod copy;
pub mod health;
pub mod validate;

/// Manifest every installed bundle must carry.
pub const PACKAGE_JSON: &str = "package.json";
/// Remote entry bundle loaded by the host at runtime.
pub const REMOTE_ENTRY: &str = "dist/remoteEntry.js";
