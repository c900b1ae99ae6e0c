//! Plugin/module repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Look up, create and delete a user's plugin and module rows.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Creation and deletion each run in exactly one transaction.
//! - A failed write is rolled back explicitly before the error is returned.
//! - Every statement is scoped by `user_id`.

use crate::db::DbError;
use crate::model::record::{ModuleRecord, PluginRecord};
use log::{info, warn};
use rusqlite::{named_params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use thiserror::Error;

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error(transparent)]
    Db(#[from] DbError),
    /// Plugin row vanished between the existence check and the delete.
    #[error("Plugin not found")]
    PluginNotFound(String),
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Summary of an existing plugin row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledPlugin {
    pub id: String,
    pub name: String,
    pub version: String,
    pub enabled: bool,
}

/// Outcome of deleting a user's plugin rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeletedRecords {
    pub deleted_modules: usize,
}

/// Repository interface for per-user plugin rows.
pub trait PluginRepository {
    fn find_plugin(&self, user_id: &str, plugin_slug: &str) -> RepoResult<Option<InstalledPlugin>>;
    /// Inserts the plugin row and all module rows, returning the module ids.
    fn create_records(
        &mut self,
        plugin: &PluginRecord,
        modules: &[ModuleRecord],
    ) -> RepoResult<Vec<String>>;
    fn delete_records(&mut self, user_id: &str, plugin_id: &str) -> RepoResult<DeletedRecords>;
}

/// SQLite-backed plugin repository bound to a host session.
pub struct SqlitePluginRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqlitePluginRepository<'conn> {
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }
}

impl PluginRepository for SqlitePluginRepository<'_> {
    fn find_plugin(&self, user_id: &str, plugin_slug: &str) -> RepoResult<Option<InstalledPlugin>> {
        let found = self
            .conn
            .query_row(
                "SELECT id, name, version, enabled
                 FROM plugin
                 WHERE user_id = :user_id AND plugin_slug = :plugin_slug;",
                named_params! {
                    ":user_id": user_id,
                    ":plugin_slug": plugin_slug,
                },
                |row| {
                    Ok(InstalledPlugin {
                        id: row.get("id")?,
                        name: row.get("name")?,
                        version: row.get("version")?,
                        enabled: row.get("enabled")?,
                    })
                },
            )
            .optional()?;
        Ok(found)
    }

    fn create_records(
        &mut self,
        plugin: &PluginRecord,
        modules: &[ModuleRecord],
    ) -> RepoResult<Vec<String>> {
        let module_ids = within_transaction(self.conn, "create_records", |tx| {
            insert_plugin(tx, plugin)?;
            modules
                .iter()
                .map(|module| {
                    insert_module(tx, module)?;
                    Ok(module.id.clone())
                })
                .collect::<RepoResult<Vec<_>>>()
        })?;

        info!(
            "event=records_create module=repo status=ok plugin_id={} modules={}",
            plugin.id,
            module_ids.len()
        );
        Ok(module_ids)
    }

    fn delete_records(&mut self, user_id: &str, plugin_id: &str) -> RepoResult<DeletedRecords> {
        let deleted = within_transaction(self.conn, "delete_records", |tx| {
            let deleted_modules = tx.execute(
                "DELETE FROM module
                 WHERE plugin_id = :plugin_id AND user_id = :user_id;",
                named_params! {
                    ":plugin_id": plugin_id,
                    ":user_id": user_id,
                },
            )?;

            let deleted_plugins = tx.execute(
                "DELETE FROM plugin
                 WHERE id = :plugin_id AND user_id = :user_id;",
                named_params! {
                    ":plugin_id": plugin_id,
                    ":user_id": user_id,
                },
            )?;
            if deleted_plugins == 0 {
                return Err(RepoError::PluginNotFound(plugin_id.to_string()));
            }

            Ok(DeletedRecords { deleted_modules })
        })?;

        info!(
            "event=records_delete module=repo status=ok plugin_id={plugin_id} modules={}",
            deleted.deleted_modules
        );
        Ok(deleted)
    }
}

/// Runs `op` in one immediate transaction: commit on `Ok`, explicit rollback on `Err`.
fn within_transaction<T>(
    conn: &mut Connection,
    operation: &'static str,
    op: impl FnOnce(&Transaction<'_>) -> RepoResult<T>,
) -> RepoResult<T> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    match op(&tx) {
        Ok(value) => {
            tx.commit()?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback() {
                warn!(
                    "event=tx_rollback module=repo status=error operation={operation} error={rollback_err}"
                );
            } else {
                warn!("event=tx_rollback module=repo status=ok operation={operation} cause={err}");
            }
            Err(err)
        }
    }
}

fn insert_plugin(tx: &Transaction<'_>, plugin: &PluginRecord) -> RepoResult<()> {
    tx.execute(
        "INSERT INTO plugin (
            id, name, description, version, type, enabled, icon, category, status,
            official, author, last_updated, compatibility, downloads, scope,
            bundle_method, bundle_location, is_local, long_description,
            config_fields, messages, dependencies, created_at, updated_at, user_id,
            plugin_slug, source_type, source_url, update_check_url, last_update_check,
            update_available, latest_version, installation_type, permissions
        ) VALUES (
            :id, :name, :description, :version, :type, :enabled, :icon, :category, :status,
            :official, :author, :last_updated, :compatibility, :downloads, :scope,
            :bundle_method, :bundle_location, :is_local, :long_description,
            :config_fields, :messages, :dependencies, :created_at, :updated_at, :user_id,
            :plugin_slug, :source_type, :source_url, :update_check_url, :last_update_check,
            :update_available, :latest_version, :installation_type, :permissions
        );",
        named_params! {
            ":id": plugin.id,
            ":name": plugin.name,
            ":description": plugin.description,
            ":version": plugin.version,
            ":type": plugin.plugin_type,
            ":enabled": plugin.enabled,
            ":icon": plugin.icon,
            ":category": plugin.category,
            ":status": plugin.status,
            ":official": plugin.official,
            ":author": plugin.author,
            ":last_updated": plugin.last_updated,
            ":compatibility": plugin.compatibility,
            ":downloads": plugin.downloads,
            ":scope": plugin.scope,
            ":bundle_method": plugin.bundle_method,
            ":bundle_location": plugin.bundle_location,
            ":is_local": plugin.is_local,
            ":long_description": plugin.long_description,
            ":config_fields": plugin.config_fields,
            ":messages": plugin.messages,
            ":dependencies": plugin.dependencies,
            ":created_at": plugin.created_at,
            ":updated_at": plugin.updated_at,
            ":user_id": plugin.user_id,
            ":plugin_slug": plugin.plugin_slug,
            ":source_type": plugin.source_type,
            ":source_url": plugin.source_url,
            ":update_check_url": plugin.update_check_url,
            ":last_update_check": plugin.last_update_check,
            ":update_available": plugin.update_available,
            ":latest_version": plugin.latest_version,
            ":installation_type": plugin.installation_type,
            ":permissions": plugin.permissions,
        },
    )?;
    Ok(())
}

fn insert_module(tx: &Transaction<'_>, module: &ModuleRecord) -> RepoResult<()> {
    tx.execute(
        "INSERT INTO module (
            id, plugin_id, name, display_name, description, icon, category,
            enabled, priority, props, config_fields, messages, required_services,
            dependencies, layout, tags, created_at, updated_at, user_id
        ) VALUES (
            :id, :plugin_id, :name, :display_name, :description, :icon, :category,
            :enabled, :priority, :props, :config_fields, :messages, :required_services,
            :dependencies, :layout, :tags, :created_at, :updated_at, :user_id
        );",
        named_params! {
            ":id": module.id,
            ":plugin_id": module.plugin_id,
            ":name": module.name,
            ":display_name": module.display_name,
            ":description": module.description,
            ":icon": module.icon,
            ":category": module.category,
            ":enabled": module.enabled,
            ":priority": module.priority,
            ":props": module.props,
            ":config_fields": module.config_fields,
            ":messages": module.messages,
            ":required_services": module.required_services,
            ":dependencies": module.dependencies,
            ":layout": module.layout,
            ":tags": module.tags,
            ":created_at": module.created_at,
            ":updated_at": module.updated_at,
            ":user_id": module.user_id,
        },
    )?;
    Ok(())
}
