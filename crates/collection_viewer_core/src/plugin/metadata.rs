//! Plugin and module metadata declarations with validation.
//!
//! # Responsibility
//! - Describe what the host stores in the `plugin` and `module` tables.
//! - Reject malformed declarations before any file or row is written.
//!
//! # Invariants
//! - A manifest declares at least one module.
//! - Module names are unique within one manifest.
//! - Layout minimums never exceed the defaults.

use crate::plugin::permission::{parse_permission, PermissionError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::Path;
use thiserror::Error;

static PLUGIN_SLUG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_-]*$").expect("valid slug regex"));
static SEMVER_TRIPLET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.\d+\.\d+$").expect("valid semver regex"));

/// Plugin-level metadata, one `plugin` row per installing user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginMetadata {
    pub name: String,
    pub description: String,
    pub version: String,
    /// Serialized as `type` to match the host column.
    #[serde(rename = "type")]
    pub plugin_type: String,
    pub icon: String,
    pub category: String,
    pub official: bool,
    pub author: String,
    pub compatibility: String,
    pub scope: String,
    pub bundle_method: String,
    /// Bundle path relative to the plugin root, e.g. `dist/remoteEntry.js`.
    pub bundle_location: String,
    pub is_local: bool,
    pub long_description: String,
    pub plugin_slug: String,
    pub source_type: String,
    pub source_url: String,
    pub update_check_url: String,
    pub last_update_check: Option<String>,
    pub update_available: bool,
    pub latest_version: Option<String>,
    pub installation_type: String,
    pub permissions: Vec<String>,
}

/// Grid constraints the host applies when placing a module on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleLayout {
    pub min_width: u32,
    pub min_height: u32,
    pub default_width: u32,
    pub default_height: u32,
}

/// Module-level metadata, one `module` row per installing user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleMetadata {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub icon: String,
    pub category: String,
    pub priority: i64,
    pub props: Value,
    pub config_fields: Value,
    pub messages: Value,
    pub required_services: Value,
    pub dependencies: Vec<String>,
    pub layout: ModuleLayout,
    pub tags: Vec<String>,
}

/// Full static declaration of one plugin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginManifest {
    pub plugin: PluginMetadata,
    pub modules: Vec<ModuleMetadata>,
}

impl PluginManifest {
    /// Validates declaration-level invariants.
    pub fn validate(&self) -> Result<(), MetadataValidationError> {
        let plugin = &self.plugin;

        let slug = plugin.plugin_slug.trim();
        if slug.is_empty() {
            return Err(MetadataValidationError::EmptySlug);
        }
        if !PLUGIN_SLUG_RE.is_match(slug) {
            return Err(MetadataValidationError::InvalidSlug(
                plugin.plugin_slug.clone(),
            ));
        }

        if plugin.version.trim().is_empty() {
            return Err(MetadataValidationError::EmptyVersion);
        }
        if !SEMVER_TRIPLET_RE.is_match(plugin.version.trim()) {
            return Err(MetadataValidationError::InvalidVersion(
                plugin.version.clone(),
            ));
        }

        let bundle = plugin.bundle_location.trim();
        if bundle.is_empty() || Path::new(bundle).is_absolute() {
            return Err(MetadataValidationError::InvalidBundleLocation(
                plugin.bundle_location.clone(),
            ));
        }

        for permission in &plugin.permissions {
            parse_permission(permission)?;
        }

        if self.modules.is_empty() {
            return Err(MetadataValidationError::MissingModules);
        }

        let mut names = BTreeSet::new();
        for module in &self.modules {
            let name = module.name.trim();
            if name.is_empty() {
                return Err(MetadataValidationError::EmptyModuleName);
            }
            if !names.insert(name) {
                return Err(MetadataValidationError::DuplicateModuleName(
                    name.to_string(),
                ));
            }
            validate_layout(name, &module.layout)?;
        }

        Ok(())
    }
}

fn validate_layout(module: &str, layout: &ModuleLayout) -> Result<(), MetadataValidationError> {
    let reason = if layout.min_width == 0 || layout.min_height == 0 {
        "minimum size must be positive"
    } else if layout.min_width > layout.default_width {
        "minWidth exceeds defaultWidth"
    } else if layout.min_height > layout.default_height {
        "minHeight exceeds defaultHeight"
    } else {
        return Ok(());
    };

    Err(MetadataValidationError::InvalidLayout {
        module: module.to_string(),
        reason,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetadataValidationError {
    #[error("plugin slug must not be empty")]
    EmptySlug,
    #[error("plugin slug is invalid: {0}")]
    InvalidSlug(String),
    #[error("plugin version must not be empty")]
    EmptyVersion,
    #[error("plugin version is invalid: {0} (expected major.minor.patch)")]
    InvalidVersion(String),
    #[error("bundle location must be a non-empty relative path: {0}")]
    InvalidBundleLocation(String),
    #[error("invalid plugin permission: {0}")]
    Permission(#[from] PermissionError),
    #[error("plugin must declare at least one module")]
    MissingModules,
    #[error("module name must not be empty")]
    EmptyModuleName,
    #[error("module name is duplicated: {0}")]
    DuplicateModuleName(String),
    #[error("module `{module}` has an invalid layout: {reason}")]
    InvalidLayout {
        module: String,
        reason: &'static str,
    },
}
