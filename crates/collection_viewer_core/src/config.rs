//! Runtime configuration resolved from the environment.
//!
//! # Responsibility
//! - Resolve the plugin source root, shared storage base, database path and
//!   logging settings for standalone runs.
//!
//! # Invariants
//! - Blank variables are treated as unset.
//! - Resolution never fails; every field has a default except the optional dirs.

use crate::logging::default_log_level;
use std::path::PathBuf;

/// Base directory holding `shared/<slug>/v<version>`.
pub const ENV_PLUGINS_DIR: &str = "COLLECTION_VIEWER_PLUGINS_DIR";
/// Directory holding the plugin's bundled files.
pub const ENV_SOURCE_DIR: &str = "COLLECTION_VIEWER_SOURCE_DIR";
/// SQLite database file used as the host session.
pub const ENV_DB_PATH: &str = "COLLECTION_VIEWER_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "COLLECTION_VIEWER_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "COLLECTION_VIEWER_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "collection_viewer.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleConfig {
    pub plugins_base_dir: Option<PathBuf>,
    pub source_dir: PathBuf,
    pub db_path: PathBuf,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
}

impl LifecycleConfig {
    /// Loads `.env` when present, then resolves from process environment.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let value = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };

        Self {
            plugins_base_dir: value(ENV_PLUGINS_DIR).map(PathBuf::from),
            source_dir: value(ENV_SOURCE_DIR)
                .map(PathBuf::from)
                .unwrap_or_else(default_source_dir),
            db_path: value(ENV_DB_PATH)
                .map(PathBuf::from)
                .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)),
            log_level: value(ENV_LOG_LEVEL).unwrap_or_else(|| default_log_level().to_string()),
            log_dir: value(ENV_LOG_DIR).map(PathBuf::from),
        }
    }
}

/// Plugin source root used when none is configured: the working directory.
pub fn default_source_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::{LifecycleConfig, ENV_DB_PATH, ENV_LOG_LEVEL, ENV_PLUGINS_DIR, ENV_SOURCE_DIR};
    use std::collections::HashMap;
    use std::path::PathBuf;

    #[test]
    fn reads_configured_values() {
        let vars: HashMap<&str, &str> = [
            (ENV_PLUGINS_DIR, "/srv/plugins"),
            (ENV_SOURCE_DIR, " /srv/src/CollectionViewer "),
            (ENV_DB_PATH, "/srv/host.db"),
            (ENV_LOG_LEVEL, "warn"),
        ]
        .into_iter()
        .collect();

        let config = LifecycleConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.plugins_base_dir, Some(PathBuf::from("/srv/plugins")));
        assert_eq!(config.source_dir, PathBuf::from("/srv/src/CollectionViewer"));
        assert_eq!(config.db_path, PathBuf::from("/srv/host.db"));
        assert_eq!(config.log_level, "warn");
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = LifecycleConfig::from_lookup(|_| Some("   ".to_string()));
        assert!(config.plugins_base_dir.is_none());
        assert!(config.db_path.ends_with("collection_viewer.sqlite3"));
        assert_eq!(config.log_level, crate::logging::default_log_level());
    }
}
