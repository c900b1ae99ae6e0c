//! Base lifecycle manager and the hook contract plugins implement.

use crate::lifecycle::error::{LifecycleError, LifecycleResult};
use crate::plugin::metadata::{ModuleMetadata, PluginMetadata};
use chrono::{DateTime, Local};
use log::info;
use rusqlite::Connection;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Result of a successful per-user installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallOutcome {
    pub plugin_id: String,
    pub plugin_slug: String,
    pub plugin_name: String,
    pub modules_created: Vec<String>,
}

/// Result of a successful per-user uninstallation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UninstallOutcome {
    pub plugin_id: String,
    pub deleted_modules: usize,
}

/// Plugin-specific hooks driven by [`BaseLifecycleManager`].
pub trait LifecycleHooks {
    fn plugin_metadata(&self) -> &PluginMetadata;
    fn module_metadata(&self) -> &[ModuleMetadata];

    /// Writes the user's plugin/module rows. Files are already in `shared_plugin_path`.
    fn perform_user_installation(
        &self,
        user_id: &str,
        conn: &mut Connection,
        shared_plugin_path: &Path,
    ) -> LifecycleResult<InstallOutcome>;

    /// Removes the user's plugin/module rows.
    fn perform_user_uninstallation(
        &self,
        user_id: &str,
        conn: &mut Connection,
    ) -> LifecycleResult<UninstallOutcome>;
}

/// Tracks active users for one plugin version and guards hook invocation.
#[derive(Debug)]
pub struct BaseLifecycleManager<H> {
    hooks: H,
    plugin_slug: String,
    version: String,
    shared_path: PathBuf,
    active_users: BTreeSet<String>,
    instance_id: String,
    created_at: DateTime<Local>,
    last_used: DateTime<Local>,
}

impl<H: LifecycleHooks> BaseLifecycleManager<H> {
    pub fn new(hooks: H, shared_path: impl Into<PathBuf>) -> Self {
        let plugin_slug = hooks.plugin_metadata().plugin_slug.clone();
        let version = hooks.plugin_metadata().version.clone();
        let now = Local::now();
        Self {
            instance_id: format!("{plugin_slug}_{version}"),
            hooks,
            plugin_slug,
            version,
            shared_path: shared_path.into(),
            active_users: BTreeSet::new(),
            created_at: now,
            last_used: now,
        }
    }

    /// Installs for `user_id` unless the user is already active.
    pub fn install_for_user(
        &mut self,
        user_id: &str,
        conn: &mut Connection,
        shared_plugin_path: &Path,
    ) -> LifecycleResult<InstallOutcome> {
        if self.active_users.contains(user_id) {
            return Err(LifecycleError::AlreadyActive);
        }

        let outcome = self
            .hooks
            .perform_user_installation(user_id, conn, shared_plugin_path)?;
        self.active_users.insert(user_id.to_string());
        self.last_used = Local::now();
        info!(
            "event=user_install module=lifecycle status=ok instance={} active_users={}",
            self.instance_id,
            self.active_users.len()
        );
        Ok(outcome)
    }

    /// Uninstalls for `user_id` when the user is active.
    pub fn uninstall_for_user(
        &mut self,
        user_id: &str,
        conn: &mut Connection,
    ) -> LifecycleResult<UninstallOutcome> {
        if !self.active_users.contains(user_id) {
            return Err(LifecycleError::NotActive);
        }

        let outcome = self.hooks.perform_user_uninstallation(user_id, conn)?;
        self.active_users.remove(user_id);
        self.last_used = Local::now();
        info!(
            "event=user_uninstall module=lifecycle status=ok instance={} active_users={}",
            self.instance_id,
            self.active_users.len()
        );
        Ok(outcome)
    }

    /// Marks `user_id` active without running hooks, e.g. after reading persisted rows.
    pub fn mark_active(&mut self, user_id: &str) {
        self.active_users.insert(user_id.to_string());
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn plugin_slug(&self) -> &str {
        &self.plugin_slug
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn shared_path(&self) -> &Path {
        &self.shared_path
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    pub fn is_active(&self, user_id: &str) -> bool {
        self.active_users.contains(user_id)
    }

    pub fn active_users(&self) -> impl Iterator<Item = &str> {
        self.active_users.iter().map(String::as_str)
    }

    pub fn created_at(&self) -> DateTime<Local> {
        self.created_at
    }

    pub fn last_used(&self) -> DateTime<Local> {
        self.last_used
    }
}
