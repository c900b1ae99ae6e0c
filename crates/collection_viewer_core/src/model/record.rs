//! Per-user plugin/module row records derived from static metadata.

use crate::plugin::metadata::{ModuleMetadata, PluginMetadata};
use chrono::Local;

/// Timestamp layout used by the host for `created_at`/`updated_at`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// Status assigned to freshly installed plugins.
pub const STATUS_ACTIVATED: &str = "activated";

/// Returns the current local time in host timestamp layout.
pub fn current_timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Row id of a user's plugin record.
pub fn plugin_record_id(user_id: &str, plugin_slug: &str) -> String {
    format!("{user_id}_{plugin_slug}")
}

/// Row id of a user's module record.
pub fn module_record_id(user_id: &str, plugin_slug: &str, module_name: &str) -> String {
    format!("{user_id}_{plugin_slug}_{module_name}")
}

/// Column values for one `plugin` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginRecord {
    pub id: String,
    pub user_id: String,
    pub plugin_slug: String,
    pub name: String,
    pub description: String,
    pub version: String,
    pub plugin_type: String,
    pub enabled: bool,
    pub icon: String,
    pub category: String,
    pub status: String,
    pub official: bool,
    pub author: String,
    pub last_updated: String,
    pub compatibility: String,
    pub downloads: i64,
    pub scope: String,
    pub bundle_method: String,
    pub bundle_location: String,
    pub is_local: bool,
    pub long_description: String,
    /// JSON text; always `{}` for a fresh install.
    pub config_fields: String,
    pub messages: Option<String>,
    pub dependencies: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub source_type: String,
    pub source_url: String,
    pub update_check_url: String,
    pub last_update_check: Option<String>,
    pub update_available: bool,
    pub latest_version: Option<String>,
    pub installation_type: String,
    /// JSON array text.
    pub permissions: String,
}

impl PluginRecord {
    /// Builds the row for `user_id` with every timestamp set to `timestamp`.
    pub fn for_user(
        user_id: &str,
        metadata: &PluginMetadata,
        timestamp: &str,
    ) -> serde_json::Result<Self> {
        Ok(Self {
            id: plugin_record_id(user_id, &metadata.plugin_slug),
            user_id: user_id.to_string(),
            plugin_slug: metadata.plugin_slug.clone(),
            name: metadata.name.clone(),
            description: metadata.description.clone(),
            version: metadata.version.clone(),
            plugin_type: metadata.plugin_type.clone(),
            enabled: true,
            icon: metadata.icon.clone(),
            category: metadata.category.clone(),
            status: STATUS_ACTIVATED.to_string(),
            official: metadata.official,
            author: metadata.author.clone(),
            last_updated: timestamp.to_string(),
            compatibility: metadata.compatibility.clone(),
            downloads: 0,
            scope: metadata.scope.clone(),
            bundle_method: metadata.bundle_method.clone(),
            bundle_location: metadata.bundle_location.clone(),
            is_local: metadata.is_local,
            long_description: metadata.long_description.clone(),
            config_fields: "{}".to_string(),
            messages: None,
            dependencies: None,
            created_at: timestamp.to_string(),
            updated_at: timestamp.to_string(),
            source_type: metadata.source_type.clone(),
            source_url: metadata.source_url.clone(),
            update_check_url: metadata.update_check_url.clone(),
            last_update_check: metadata.last_update_check.clone(),
            update_available: metadata.update_available,
            latest_version: metadata.latest_version.clone(),
            installation_type: metadata.installation_type.clone(),
            permissions: serde_json::to_string(&metadata.permissions)?,
        })
    }
}

/// Column values for one `module` row. JSON columns are pre-serialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRecord {
    pub id: String,
    pub plugin_id: String,
    pub user_id: String,
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub icon: String,
    pub category: String,
    pub enabled: bool,
    pub priority: i64,
    pub props: String,
    pub config_fields: String,
    pub messages: String,
    pub required_services: String,
    pub dependencies: String,
    pub layout: String,
    pub tags: String,
    pub created_at: String,
    pub updated_at: String,
}

impl ModuleRecord {
    pub fn for_user(
        user_id: &str,
        plugin: &PluginRecord,
        metadata: &ModuleMetadata,
        timestamp: &str,
    ) -> serde_json::Result<Self> {
        Ok(Self {
            id: module_record_id(user_id, &plugin.plugin_slug, &metadata.name),
            plugin_id: plugin.id.clone(),
            user_id: user_id.to_string(),
            name: metadata.name.clone(),
            display_name: metadata.display_name.clone(),
            description: metadata.description.clone(),
            icon: metadata.icon.clone(),
            category: metadata.category.clone(),
            enabled: true,
            priority: metadata.priority,
            props: serde_json::to_string(&metadata.props)?,
            config_fields: serde_json::to_string(&metadata.config_fields)?,
            messages: serde_json::to_string(&metadata.messages)?,
            required_services: serde_json::to_string(&metadata.required_services)?,
            dependencies: serde_json::to_string(&metadata.dependencies)?,
            layout: serde_json::to_string(&metadata.layout)?,
            tags: serde_json::to_string(&metadata.tags)?,
            created_at: timestamp.to_string(),
            updated_at: timestamp.to_string(),
        })
    }
}
