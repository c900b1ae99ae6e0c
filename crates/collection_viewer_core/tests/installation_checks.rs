use collection_viewer_core::{plugin_health, validate_installation};
use std::fs;
use std::path::Path;

fn installed_dir(bundle: Option<&str>, package_json: Option<&str>) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    if let Some(contents) = bundle {
        fs::create_dir_all(dir.path().join("dist")).unwrap();
        fs::write(dir.path().join("dist/remoteEntry.js"), contents).unwrap();
    }
    if let Some(contents) = package_json {
        fs::write(dir.path().join("package.json"), contents).unwrap();
    }
    dir
}

const PACKAGE_JSON: &str = r#"{"name": "collection-viewer", "version": "1.0.0"}"#;

fn error_of(dir: &Path) -> String {
    let report = validate_installation("user", dir);
    assert!(!report.valid);
    report.error.expect("failed validation carries an error")
}

#[test]
fn valid_installation_passes() {
    let dir = installed_dir(Some("var a;"), Some(PACKAGE_JSON));
    let report = validate_installation("user", dir.path());
    assert!(report.valid, "{:?}", report.error);
    assert!(report.error.is_none());
}

#[test]
fn missing_bundle_is_named() {
    let dir = installed_dir(None, Some(PACKAGE_JSON));
    assert_eq!(
        error_of(dir.path()),
        "Missing required files: dist/remoteEntry.js"
    );
}

#[test]
fn empty_bundle_has_distinct_message() {
    let dir = installed_dir(Some(""), Some(PACKAGE_JSON));
    assert_eq!(error_of(dir.path()), "Bundle file is empty");
}

#[test]
fn package_json_must_parse_and_declare_version() {
    let dir = installed_dir(Some("var a;"), Some("{ broken"));
    assert!(error_of(dir.path()).starts_with("Invalid package.json:"));

    let dir = installed_dir(Some("var a;"), Some(r#"{"name": "cv"}"#));
    assert_eq!(
        error_of(dir.path()),
        "package.json missing required field: version"
    );
}

#[test]
fn health_requires_all_probes() {
    let healthy = installed_dir(Some("var a;"), Some(PACKAGE_JSON));
    let report = plugin_health("user", healthy.path());
    assert!(report.healthy);
    assert_eq!(report.details.bundle_size, 6);

    let empty_bundle = installed_dir(Some(""), Some(PACKAGE_JSON));
    let report = plugin_health("user", empty_bundle.path());
    assert!(!report.healthy);
    assert!(report.details.bundle_exists);
    assert!(report.details.package_json_valid);

    let no_package = installed_dir(Some("var a;"), None);
    assert!(!plugin_health("user", no_package.path()).healthy);
}

#[test]
fn health_report_serializes_for_host() {
    let dir = installed_dir(Some("var a;"), Some(PACKAGE_JSON));
    let value = serde_json::to_value(plugin_health("user", dir.path())).unwrap();
    assert_eq!(value["healthy"], true);
    assert_eq!(value["details"]["bundle_exists"], true);
    assert!(value["details"].get("error").is_none());
}
