//! Bundled CollectionViewer declaration.

use crate::plugin::metadata::{ModuleLayout, ModuleMetadata, PluginManifest, PluginMetadata};
use crate::plugin::permission::PERMISSION_API_ACCESS;
use serde_json::{json, Value};

/// Stable slug of the CollectionViewer plugin.
pub const PLUGIN_SLUG: &str = "CollectionViewer";
/// Released version copied into `shared/<slug>/v<version>`.
pub const PLUGIN_VERSION: &str = "1.0.0";

/// Builds the plugin and module metadata the host registers on install.
pub fn collection_viewer_manifest() -> PluginManifest {
    PluginManifest {
        plugin: PluginMetadata {
            name: "CollectionViewer".to_string(),
            description: "View and browse your document collections".to_string(),
            version: PLUGIN_VERSION.to_string(),
            plugin_type: "frontend".to_string(),
            icon: "folder_open".to_string(),
            category: "Data Management".to_string(),
            official: false,
            author: "BrainDrive Team".to_string(),
            compatibility: "1.0.0".to_string(),
            scope: "CollectionViewer".to_string(),
            bundle_method: "webpack".to_string(),
            bundle_location: "dist/remoteEntry.js".to_string(),
            is_local: false,
            long_description: "A simple, functional React component plugin that fetches and \
                displays collections from your BrainDrive instance. Built with modern React \
                hooks and TypeScript."
                .to_string(),
            plugin_slug: PLUGIN_SLUG.to_string(),
            source_type: "local".to_string(),
            source_url: String::new(),
            update_check_url: String::new(),
            last_update_check: None,
            update_available: false,
            latest_version: None,
            installation_type: "remote".to_string(),
            permissions: vec![PERMISSION_API_ACCESS.to_string()],
        },
        modules: vec![ModuleMetadata {
            name: "CollectionViewer".to_string(),
            display_name: "Collection Viewer".to_string(),
            description: "View all your document collections with details".to_string(),
            icon: "folder_open".to_string(),
            category: "Data Management".to_string(),
            priority: 1,
            props: empty_object(),
            config_fields: empty_object(),
            messages: empty_object(),
            required_services: empty_object(),
            dependencies: Vec::new(),
            layout: ModuleLayout {
                min_width: 4,
                min_height: 4,
                default_width: 8,
                default_height: 6,
            },
            tags: ["collections", "viewer", "documents", "data"]
                .into_iter()
                .map(str::to_string)
                .collect(),
        }],
    }
}

fn empty_object() -> Value {
    json!({})
}
