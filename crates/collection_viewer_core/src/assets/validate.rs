//! Installation validation for a copied plugin directory.

use crate::assets::{PACKAGE_JSON, REMOTE_ENTRY};
use log::{error, info};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

/// Files that must exist for an installation to be usable.
pub const REQUIRED_FILES: &[&str] = &[PACKAGE_JSON, REMOTE_ENTRY];
/// Fields `package.json` must declare.
pub const REQUIRED_PACKAGE_FIELDS: &[&str] = &["name", "version"];

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing required files: {}", .0.join(", "))]
    MissingFiles(Vec<String>),
    #[error("Invalid package.json: {0}")]
    InvalidPackageJson(String),
    #[error("package.json missing required field: {0}")]
    MissingPackageField(&'static str),
    #[error("Bundle file is empty")]
    EmptyBundle,
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Validation verdict returned to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValidationReport {
    pub fn passed() -> Self {
        Self {
            valid: true,
            error: None,
        }
    }

    pub fn failed(error: impl ToString) -> Self {
        Self {
            valid: false,
            error: Some(error.to_string()),
        }
    }
}

/// Runs [`check_installation`] for `user_id` and logs the verdict.
pub fn installation_report(user_id: &str, plugin_dir: &Path) -> ValidationReport {
    match check_installation(plugin_dir) {
        Ok(()) => {
            info!("event=install_validate module=assets status=ok user_id={user_id}");
            ValidationReport::passed()
        }
        Err(err) => {
            error!("event=install_validate module=assets status=error user_id={user_id} error={err}");
            ValidationReport::failed(err)
        }
    }
}

/// Checks required files, `package.json` shape and bundle size, in that order.
pub fn check_installation(plugin_dir: &Path) -> Result<(), ValidationError> {
    let missing: Vec<String> = REQUIRED_FILES
        .iter()
        .filter(|file| !plugin_dir.join(file).exists())
        .map(|file| file.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::MissingFiles(missing));
    }

    let raw = fs::read_to_string(plugin_dir.join(PACKAGE_JSON))
        .map_err(|err| ValidationError::InvalidPackageJson(err.to_string()))?;
    let package: Value = serde_json::from_str(&raw)
        .map_err(|err| ValidationError::InvalidPackageJson(err.to_string()))?;
    for &field in REQUIRED_PACKAGE_FIELDS {
        if package.get(field).is_none() {
            return Err(ValidationError::MissingPackageField(field));
        }
    }

    if fs::metadata(plugin_dir.join(REMOTE_ENTRY))?.len() == 0 {
        return Err(ValidationError::EmptyBundle);
    }

    Ok(())
}
