//! Health probe for an installed plugin directory.

use crate::assets::{PACKAGE_JSON, REMOTE_ENTRY};
use log::error;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::Path;

/// Individual probe results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HealthDetails {
    pub bundle_exists: bool,
    pub bundle_size: u64,
    pub package_json_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Health verdict returned to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub healthy: bool,
    pub details: HealthDetails,
}

/// Probes bundle presence, bundle size and `package.json` parseability.
///
/// Healthy only when all three probes pass. I/O failures other than a missing
/// file produce an unhealthy report carrying the error text.
pub fn probe_health(plugin_dir: &Path) -> HealthReport {
    match collect_details(plugin_dir) {
        Ok(details) => HealthReport {
            healthy: details.bundle_exists && details.bundle_size > 0 && details.package_json_valid,
            details,
        },
        Err(err) => HealthReport {
            healthy: false,
            details: HealthDetails {
                error: Some(err.to_string()),
                ..HealthDetails::default()
            },
        },
    }
}

/// Runs [`probe_health`] for `user_id`, logging probe I/O failures.
pub fn health_report(user_id: &str, plugin_dir: &Path) -> HealthReport {
    let report = probe_health(plugin_dir);
    if let Some(err) = report.details.error.as_deref() {
        error!("event=plugin_health module=assets status=error user_id={user_id} error={err}");
    }
    report
}

fn collect_details(plugin_dir: &Path) -> io::Result<HealthDetails> {
    let mut details = HealthDetails::default();

    match fs::metadata(plugin_dir.join(REMOTE_ENTRY)) {
        Ok(meta) => {
            details.bundle_exists = true;
            details.bundle_size = meta.len();
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }

    match fs::read_to_string(plugin_dir.join(PACKAGE_JSON)) {
        Ok(raw) => {
            details.package_json_valid = serde_json::from_str::<serde_json::Value>(&raw).is_ok();
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }

    Ok(details)
}

#[cfg(test)]
mod tests {
    use super::probe_health;
    use std::fs;

    #[test]
    fn empty_directory_is_unhealthy_without_error() {
        let dir = tempfile::tempdir().unwrap();
        let report = probe_health(dir.path());
        assert!(!report.healthy);
        assert!(!report.details.bundle_exists);
        assert!(report.details.error.is_none());
    }

    #[test]
    fn reports_bundle_size_and_parse_state() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("dist")).unwrap();
        fs::write(dir.path().join("dist/remoteEntry.js"), "var a;").unwrap();
        fs::write(dir.path().join("package.json"), "{ not json").unwrap();

        let report = probe_health(dir.path());
        assert!(!report.healthy);
        assert!(report.details.bundle_exists);
        assert_eq!(report.details.bundle_size, 6);
        assert!(!report.details.package_json_valid);

        fs::write(dir.path().join("package.json"), "{}").unwrap();
        assert!(probe_health(dir.path()).healthy);
    }
}
