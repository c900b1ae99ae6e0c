//! Host permission declarations carried by plugin metadata.

use thiserror::Error;

/// Host API permission a plugin may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PluginPermission {
    ApiAccess,
    StorageRead,
    StorageWrite,
    Network,
}

/// Permission string for authenticated host API calls.
pub const PERMISSION_API_ACCESS: &str = "api.access";
/// Permission string for reading plugin-scoped storage.
pub const PERMISSION_STORAGE_READ: &str = "storage.read";
/// Permission string for writing plugin-scoped storage.
pub const PERMISSION_STORAGE_WRITE: &str = "storage.write";
/// Permission string for outbound network requests.
pub const PERMISSION_NETWORK: &str = "network";

const SUPPORTED_PERMISSIONS: &[&str] = &[
    PERMISSION_API_ACCESS,
    PERMISSION_STORAGE_READ,
    PERMISSION_STORAGE_WRITE,
    PERMISSION_NETWORK,
];

impl PluginPermission {
    /// Stable string id stored in the `plugin.permissions` column.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ApiAccess => PERMISSION_API_ACCESS,
            Self::StorageRead => PERMISSION_STORAGE_READ,
            Self::StorageWrite => PERMISSION_STORAGE_WRITE,
            Self::Network => PERMISSION_NETWORK,
        }
    }
}

/// Returns every permission string the host understands.
pub fn supported_permissions() -> &'static [&'static str] {
    SUPPORTED_PERMISSIONS
}

/// Parses one declared permission string.
pub fn parse_permission(value: &str) -> Result<PluginPermission, PermissionError> {
    match value.trim() {
        "" => Err(PermissionError::Empty),
        PERMISSION_API_ACCESS => Ok(PluginPermission::ApiAccess),
        PERMISSION_STORAGE_READ => Ok(PluginPermission::StorageRead),
        PERMISSION_STORAGE_WRITE => Ok(PluginPermission::StorageWrite),
        PERMISSION_NETWORK => Ok(PluginPermission::Network),
        other => Err(PermissionError::Unsupported(other.to_string())),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PermissionError {
    #[error("permission value must not be empty")]
    Empty,
    #[error("permission is unsupported: {0}")]
    Unsupported(String),
}
