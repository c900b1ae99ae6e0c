//! Host-facing entry points.
//!
//! # Responsibility
//! - Expose `install_plugin` / `delete_plugin` with the host's call shape:
//!   user id, database session, optional plugins base dir.
//! - Convert every failure into a result envelope with an error string.
//!
//! # Invariants
//! - Functions here never panic and never return `Err`.
//! - Install and delete build a fresh manager per call; persisted rows are
//!   the source of truth.

use crate::assets::health::{health_report, HealthReport};
use crate::assets::validate::{installation_report, ValidationReport};
use crate::config::default_source_dir;
use crate::lifecycle::base::{InstallOutcome, UninstallOutcome};
use crate::lifecycle::error::LifecycleResult;
use crate::lifecycle::manager::CollectionViewerLifecycleManager;
use log::{error, info};
use rusqlite::Connection;
use serde::Serialize;
use std::path::Path;

/// Result record returned by [`install_plugin`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugin_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugin_slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugin_name: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub modules_created: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl InstallResponse {
    fn failure(error: impl ToString) -> Self {
        Self {
            success: false,
            plugin_id: None,
            plugin_slug: None,
            plugin_name: None,
            modules_created: Vec::new(),
            error: Some(error.to_string()),
        }
    }
}

impl From<InstallOutcome> for InstallResponse {
    fn from(value: InstallOutcome) -> Self {
        Self {
            success: true,
            plugin_id: Some(value.plugin_id),
            plugin_slug: Some(value.plugin_slug),
            plugin_name: Some(value.plugin_name),
            modules_created: value.modules_created,
            error: None,
        }
    }
}

/// Result record returned by [`delete_plugin`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugin_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_modules: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DeleteResponse {
    fn failure(error: impl ToString) -> Self {
        Self {
            success: false,
            plugin_id: None,
            deleted_modules: None,
            error: Some(error.to_string()),
        }
    }
}

impl From<UninstallOutcome> for DeleteResponse {
    fn from(value: UninstallOutcome) -> Self {
        Self {
            success: true,
            plugin_id: Some(value.plugin_id),
            deleted_modules: Some(value.deleted_modules),
            error: None,
        }
    }
}

/// Installs CollectionViewer for `user_id` using the default source root.
pub fn install_plugin(
    user_id: &str,
    conn: &mut Connection,
    plugins_base_dir: Option<&Path>,
) -> InstallResponse {
    install_plugin_from(user_id, conn, plugins_base_dir, &default_source_dir())
}

/// Installs CollectionViewer for `user_id`, copying files from `source_dir`.
pub fn install_plugin_from(
    user_id: &str,
    conn: &mut Connection,
    plugins_base_dir: Option<&Path>,
    source_dir: &Path,
) -> InstallResponse {
    let mut manager = match CollectionViewerLifecycleManager::new(plugins_base_dir, source_dir) {
        Ok(manager) => manager,
        Err(err) => return InstallResponse::failure(report_failure("plugin_install", user_id, err)),
    };

    match manager.install_plugin(user_id, conn) {
        Ok(outcome) => {
            info!(
                "event=plugin_install module=api status=ok user_id={user_id} plugin_id={} modules={}",
                outcome.plugin_id,
                outcome.modules_created.len()
            );
            outcome.into()
        }
        Err(err) => InstallResponse::failure(report_failure("plugin_install", user_id, err)),
    }
}

/// Removes CollectionViewer rows for `user_id`.
pub fn delete_plugin(
    user_id: &str,
    conn: &mut Connection,
    plugins_base_dir: Option<&Path>,
) -> DeleteResponse {
    delete_plugin_from(user_id, conn, plugins_base_dir, &default_source_dir())
}

/// Removes CollectionViewer rows for `user_id`; `source_dir` only shapes the manager's paths.
pub fn delete_plugin_from(
    user_id: &str,
    conn: &mut Connection,
    plugins_base_dir: Option<&Path>,
    source_dir: &Path,
) -> DeleteResponse {
    let mut manager = match CollectionViewerLifecycleManager::new(plugins_base_dir, source_dir) {
        Ok(manager) => manager,
        Err(err) => return DeleteResponse::failure(report_failure("plugin_delete", user_id, err)),
    };

    let result: LifecycleResult<UninstallOutcome> = manager
        .restore_active_user(user_id, conn)
        .and_then(|_| manager.delete_plugin(user_id, conn));

    match result {
        Ok(outcome) => {
            info!(
                "event=plugin_delete module=api status=ok user_id={user_id} plugin_id={} modules={}",
                outcome.plugin_id, outcome.deleted_modules
            );
            outcome.into()
        }
        Err(err) => DeleteResponse::failure(report_failure("plugin_delete", user_id, err)),
    }
}

/// Validates an installed CollectionViewer directory.
pub fn validate_installation(user_id: &str, plugin_dir: &Path) -> ValidationReport {
    installation_report(user_id, plugin_dir)
}

/// Probes the health of an installed CollectionViewer directory.
pub fn plugin_health(user_id: &str, plugin_dir: &Path) -> HealthReport {
    health_report(user_id, plugin_dir)
}

fn report_failure(event: &'static str, user_id: &str, err: impl ToString) -> String {
    let message = err.to_string();
    error!("event={event} module=api status=error user_id={user_id} error={message}");
    message
}
