//! Lifecycle adapter for the CollectionViewer plugin.
//!
//! Registers the plugin's static metadata, copies its bundled frontend files
//! into per-version shared storage, and creates/deletes the user's `plugin`
//! and `module` rows.

pub mod api;
pub mod assets;
pub mod config;
pub mod db;
pub mod lifecycle;
pub mod logging;
pub mod model;
pub mod plugin;
pub mod repo;

pub use api::{
    delete_plugin, delete_plugin_from, install_plugin, install_plugin_from, plugin_health,
    validate_installation, DeleteResponse, InstallResponse,
};
pub use assets::copy::{copy_plugin_files, CopyError, CopyReport};
pub use assets::health::{HealthDetails, HealthReport};
pub use assets::validate::{ValidationError, ValidationReport};
pub use config::LifecycleConfig;
pub use lifecycle::base::{BaseLifecycleManager, InstallOutcome, LifecycleHooks, UninstallOutcome};
pub use lifecycle::error::{LifecycleError, LifecycleResult};
pub use lifecycle::manager::{CollectionViewerLifecycleManager, CollectionViewerPlugin};
pub use logging::{default_log_level, init_logging, logging_status};
pub use plugin::collection_viewer::{collection_viewer_manifest, PLUGIN_SLUG, PLUGIN_VERSION};
pub use plugin::metadata::{
    MetadataValidationError, ModuleLayout, ModuleMetadata, PluginManifest, PluginMetadata,
};
pub use repo::plugin_repo::{
    InstalledPlugin, PluginRepository, RepoError, RepoResult, SqlitePluginRepository,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
