//! CollectionViewer lifecycle manager.
//!
//! # Responsibility
//! - Provide the CollectionViewer install/uninstall hooks.
//! - Copy bundled files into shared storage before rows are written.
//! - Expose validation and health probes for an installed directory.
//!
//! # Invariants
//! - Install order: existence check, file copy, plugin row, module rows, commit.
//! - Uninstall order: existence check, module rows, plugin row, commit.

use crate::assets::copy::{copy_plugin_files, CopyError, CopyReport};
use crate::assets::health::{health_report, HealthReport};
use crate::assets::validate::{installation_report, ValidationReport};
use crate::lifecycle::base::{BaseLifecycleManager, InstallOutcome, LifecycleHooks, UninstallOutcome};
use crate::lifecycle::error::{LifecycleError, LifecycleResult};
use crate::model::record::{current_timestamp, ModuleRecord, PluginRecord};
use crate::plugin::collection_viewer::collection_viewer_manifest;
use crate::plugin::metadata::{MetadataValidationError, ModuleMetadata, PluginManifest, PluginMetadata};
use crate::repo::plugin_repo::{InstalledPlugin, PluginRepository, SqlitePluginRepository};
use log::{error, info};
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};

/// Directory under the plugins base dir holding per-version bundles.
pub const SHARED_DIR_NAME: &str = "shared";

/// Resolves `<base>/shared/<slug>/v<version>`.
pub fn shared_storage_path(plugins_base_dir: &Path, plugin_slug: &str, version: &str) -> PathBuf {
    plugins_base_dir
        .join(SHARED_DIR_NAME)
        .join(plugin_slug)
        .join(format!("v{version}"))
}

/// Install/uninstall hooks for the CollectionViewer plugin.
#[derive(Debug, Clone)]
pub struct CollectionViewerPlugin {
    manifest: PluginManifest,
}

impl CollectionViewerPlugin {
    /// Uses the bundled CollectionViewer declaration.
    pub fn bundled() -> Result<Self, MetadataValidationError> {
        Self::from_manifest(collection_viewer_manifest())
    }

    pub fn from_manifest(manifest: PluginManifest) -> Result<Self, MetadataValidationError> {
        manifest.validate()?;
        Ok(Self { manifest })
    }

    pub fn manifest(&self) -> &PluginManifest {
        &self.manifest
    }

    fn find_existing(
        &self,
        user_id: &str,
        conn: &mut Connection,
    ) -> LifecycleResult<Option<InstalledPlugin>> {
        let repo = SqlitePluginRepository::new(conn);
        Ok(repo.find_plugin(user_id, &self.manifest.plugin.plugin_slug)?)
    }
}

impl LifecycleHooks for CollectionViewerPlugin {
    fn plugin_metadata(&self) -> &PluginMetadata {
        &self.manifest.plugin
    }

    fn module_metadata(&self) -> &[ModuleMetadata] {
        &self.manifest.modules
    }

    fn perform_user_installation(
        &self,
        user_id: &str,
        conn: &mut Connection,
        shared_plugin_path: &Path,
    ) -> LifecycleResult<InstallOutcome> {
        let timestamp = current_timestamp();
        let plugin = PluginRecord::for_user(user_id, &self.manifest.plugin, &timestamp)?;
        let modules = self
            .manifest
            .modules
            .iter()
            .map(|module| ModuleRecord::for_user(user_id, &plugin, module, &timestamp))
            .collect::<Result<Vec<_>, _>>()?;

        let mut repo = SqlitePluginRepository::new(conn);
        let modules_created = repo.create_records(&plugin, &modules).map_err(|err| {
            error!(
                "event=records_create module=lifecycle status=error plugin_id={} error={err}",
                plugin.id
            );
            err
        })?;

        info!(
            "event=user_install module=lifecycle status=ok plugin_id={} shared_path={}",
            plugin.id,
            shared_plugin_path.display()
        );
        Ok(InstallOutcome {
            plugin_id: plugin.id,
            plugin_slug: plugin.plugin_slug,
            plugin_name: plugin.name,
            modules_created,
        })
    }

    fn perform_user_uninstallation(
        &self,
        user_id: &str,
        conn: &mut Connection,
    ) -> LifecycleResult<UninstallOutcome> {
        let Some(existing) = self.find_existing(user_id, conn)? else {
            return Err(LifecycleError::NotFoundForUser);
        };

        let mut repo = SqlitePluginRepository::new(conn);
        let deleted = repo.delete_records(user_id, &existing.id).map_err(|err| {
            error!(
                "event=records_delete module=lifecycle status=error plugin_id={} error={err}",
                existing.id
            );
            err
        })?;

        Ok(UninstallOutcome {
            plugin_id: existing.id,
            deleted_modules: deleted.deleted_modules,
        })
    }
}

/// Lifecycle manager binding the CollectionViewer hooks to a source and shared path.
#[derive(Debug)]
pub struct CollectionViewerLifecycleManager {
    base: BaseLifecycleManager<CollectionViewerPlugin>,
    source_dir: PathBuf,
}

impl CollectionViewerLifecycleManager {
    /// Creates a manager for the bundled declaration.
    ///
    /// Without `plugins_base_dir` the shared path is `source_dir` itself.
    pub fn new(
        plugins_base_dir: Option<&Path>,
        source_dir: impl Into<PathBuf>,
    ) -> Result<Self, MetadataValidationError> {
        Ok(Self::with_plugin(
            CollectionViewerPlugin::bundled()?,
            plugins_base_dir,
            source_dir,
        ))
    }

    pub fn with_plugin(
        plugin: CollectionViewerPlugin,
        plugins_base_dir: Option<&Path>,
        source_dir: impl Into<PathBuf>,
    ) -> Self {
        let source_dir = source_dir.into();
        let metadata = plugin.plugin_metadata();
        let shared_path = match plugins_base_dir {
            Some(base) => shared_storage_path(base, &metadata.plugin_slug, &metadata.version),
            None => source_dir.clone(),
        };
        info!(
            "event=manager_init module=lifecycle status=ok slug={} shared_path={}",
            metadata.plugin_slug,
            shared_path.display()
        );

        Self {
            base: BaseLifecycleManager::new(plugin, shared_path),
            source_dir,
        }
    }

    pub fn plugin_metadata(&self) -> &PluginMetadata {
        self.base.hooks().plugin_metadata()
    }

    pub fn module_metadata(&self) -> &[ModuleMetadata] {
        self.base.hooks().module_metadata()
    }

    pub fn shared_path(&self) -> &Path {
        self.base.shared_path()
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    pub fn base(&self) -> &BaseLifecycleManager<CollectionViewerPlugin> {
        &self.base
    }

    /// Installs for `user_id`: checks for an existing row, copies files, writes rows.
    ///
    /// When the shared path is the source directory itself (no plugins base dir)
    /// the copy step is a no-op and the install still succeeds.
    pub fn install_plugin(
        &mut self,
        user_id: &str,
        conn: &mut Connection,
    ) -> LifecycleResult<InstallOutcome> {
        if self.base.hooks().find_existing(user_id, conn)?.is_some() {
            return Err(LifecycleError::AlreadyInstalled);
        }

        let shared_path = self.base.shared_path().to_path_buf();
        fs::create_dir_all(&shared_path).map_err(|source| LifecycleError::SharedDir {
            path: shared_path.clone(),
            source,
        })?;
        self.copy_plugin_files(&shared_path, false)?;

        self.base.install_for_user(user_id, conn, &shared_path)
    }

    /// Uninstalls for `user_id` through the active-user guard.
    pub fn delete_plugin(
        &mut self,
        user_id: &str,
        conn: &mut Connection,
    ) -> LifecycleResult<UninstallOutcome> {
        self.base.uninstall_for_user(user_id, conn)
    }

    /// Marks `user_id` active when a plugin row already exists for them.
    ///
    /// Returns whether the user was found.
    pub fn restore_active_user(
        &mut self,
        user_id: &str,
        conn: &mut Connection,
    ) -> LifecycleResult<bool> {
        let found = self.base.hooks().find_existing(user_id, conn)?.is_some();
        if found {
            self.base.mark_active(user_id);
        }
        Ok(found)
    }

    /// Copies bundled files from the source directory into `target_dir`.
    pub fn copy_plugin_files(&self, target_dir: &Path, update: bool) -> Result<CopyReport, CopyError> {
        copy_plugin_files(&self.source_dir, target_dir, update).map_err(|err| {
            error!("event=files_copy module=lifecycle status=error error={err}");
            err
        })
    }

    /// Validates an installed directory for `user_id`.
    pub fn validate_installation(&self, user_id: &str, plugin_dir: &Path) -> ValidationReport {
        installation_report(user_id, plugin_dir)
    }

    /// Probes the health of an installed directory for `user_id`.
    pub fn plugin_health(&self, user_id: &str, plugin_dir: &Path) -> HealthReport {
        health_report(user_id, plugin_dir)
    }
}
