use collection_viewer_core::db::open_db_in_memory;
use collection_viewer_core::{
    delete_plugin_from, install_plugin_from, CollectionViewerLifecycleManager, LifecycleError,
    PluginRepository, SqlitePluginRepository,
};
use rusqlite::Connection;
use std::fs;
use tempfile::TempDir;

fn plugin_source() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("dist")).unwrap();
    fs::write(
        dir.path().join("package.json"),
        r#"{"name": "collection-viewer", "version": "1.0.0"}"#,
    )
    .unwrap();
    fs::write(dir.path().join("dist/remoteEntry.js"), "var CollectionViewer;").unwrap();
    fs::write(dir.path().join("lifecycle_manager.py"), "# entry").unwrap();
    dir
}

fn count_rows(conn: &Connection, table: &str, user_id: &str) -> i64 {
    conn.query_row(
        &format!("SELECT COUNT(*) FROM {table} WHERE user_id = ?1;"),
        [user_id],
        |row| row.get(0),
    )
    .unwrap()
}

#[test]
fn install_creates_one_plugin_row_and_one_module_row() {
    let source = plugin_source();
    let base = tempfile::tempdir().unwrap();
    let mut conn = open_db_in_memory().unwrap();

    let response = install_plugin_from("user-1", &mut conn, Some(base.path()), source.path());
    assert!(response.success, "{:?}", response.error);
    assert_eq!(response.plugin_id.as_deref(), Some("user-1_CollectionViewer"));
    assert_eq!(response.plugin_slug.as_deref(), Some("CollectionViewer"));
    assert_eq!(response.plugin_name.as_deref(), Some("CollectionViewer"));
    assert_eq!(
        response.modules_created,
        vec!["user-1_CollectionViewer_CollectionViewer".to_string()]
    );

    assert_eq!(count_rows(&conn, "plugin", "user-1"), 1);
    assert_eq!(count_rows(&conn, "module", "user-1"), 1);

    let shared = base.path().join("shared/CollectionViewer/v1.0.0");
    assert!(shared.join("dist/remoteEntry.js").is_file());
    assert!(shared.join("lifecycle_manager.py").is_file());
}

#[test]
fn install_writes_host_column_values() {
    let source = plugin_source();
    let base = tempfile::tempdir().unwrap();
    let mut conn = open_db_in_memory().unwrap();
    assert!(install_plugin_from("u", &mut conn, Some(base.path()), source.path()).success);

    let (status, enabled, permissions, messages, created_at, updated_at): (
        String,
        bool,
        String,
        Option<String>,
        String,
        String,
    ) = conn
        .query_row(
            "SELECT status, enabled, permissions, messages, created_at, updated_at
             FROM plugin WHERE id = 'u_CollectionViewer';",
            [],
            |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                ))
            },
        )
        .unwrap();
    assert_eq!(status, "activated");
    assert!(enabled);
    assert_eq!(
        serde_json::from_str::<Vec<String>>(&permissions).unwrap(),
        vec!["api.access".to_string()]
    );
    assert!(messages.is_none());
    assert_eq!(created_at, updated_at);

    let (plugin_id, layout, required_services): (String, String, String) = conn
        .query_row(
            "SELECT plugin_id, layout, required_services FROM module WHERE user_id = 'u';",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .unwrap();
    assert_eq!(plugin_id, "u_CollectionViewer");
    let layout: serde_json::Value = serde_json::from_str(&layout).unwrap();
    assert_eq!(layout["minWidth"], 4);
    assert_eq!(layout["defaultHeight"], 6);
    assert_eq!(required_services, "{}");
}

#[test]
fn second_install_fails_and_leaves_no_duplicate_rows() {
    let source = plugin_source();
    let base = tempfile::tempdir().unwrap();
    let mut conn = open_db_in_memory().unwrap();

    assert!(install_plugin_from("user-2", &mut conn, Some(base.path()), source.path()).success);
    let second = install_plugin_from("user-2", &mut conn, Some(base.path()), source.path());

    assert!(!second.success);
    assert!(second
        .error
        .as_deref()
        .unwrap_or_default()
        .contains("already installed"));
    assert_eq!(count_rows(&conn, "plugin", "user-2"), 1);
    assert_eq!(count_rows(&conn, "module", "user-2"), 1);
}

#[test]
fn install_is_scoped_per_user() {
    let source = plugin_source();
    let base = tempfile::tempdir().unwrap();
    let mut conn = open_db_in_memory().unwrap();

    assert!(install_plugin_from("a", &mut conn, Some(base.path()), source.path()).success);
    assert!(install_plugin_from("b", &mut conn, Some(base.path()), source.path()).success);

    let deleted = delete_plugin_from("a", &mut conn, Some(base.path()), source.path());
    assert!(deleted.success, "{:?}", deleted.error);
    assert_eq!(count_rows(&conn, "plugin", "a"), 0);
    assert_eq!(count_rows(&conn, "plugin", "b"), 1);
    assert_eq!(count_rows(&conn, "module", "b"), 1);
}

#[test]
fn uninstall_removes_all_rows() {
    let source = plugin_source();
    let base = tempfile::tempdir().unwrap();
    let mut conn = open_db_in_memory().unwrap();
    assert!(install_plugin_from("user-3", &mut conn, Some(base.path()), source.path()).success);

    let response = delete_plugin_from("user-3", &mut conn, Some(base.path()), source.path());
    assert!(response.success, "{:?}", response.error);
    assert_eq!(response.plugin_id.as_deref(), Some("user-3_CollectionViewer"));
    assert_eq!(response.deleted_modules, Some(1));

    assert_eq!(count_rows(&conn, "plugin", "user-3"), 0);
    assert_eq!(count_rows(&conn, "module", "user-3"), 0);
}

#[test]
fn uninstall_of_non_installed_user_fails_without_mutation() {
    let source = plugin_source();
    let base = tempfile::tempdir().unwrap();
    let mut conn = open_db_in_memory().unwrap();
    assert!(install_plugin_from("owner", &mut conn, Some(base.path()), source.path()).success);

    let response = delete_plugin_from("stranger", &mut conn, Some(base.path()), source.path());
    assert!(!response.success);
    assert_eq!(
        response.error.as_deref(),
        Some("Plugin not installed for user")
    );
    assert_eq!(count_rows(&conn, "plugin", "owner"), 1);
    assert_eq!(count_rows(&conn, "module", "owner"), 1);
}

#[test]
fn install_fails_when_source_is_missing_and_writes_no_rows() {
    let base = tempfile::tempdir().unwrap();
    let mut conn = open_db_in_memory().unwrap();
    let missing = base.path().join("does-not-exist");

    let response = install_plugin_from("user-4", &mut conn, Some(base.path()), &missing);
    assert!(!response.success);
    assert!(response
        .error
        .as_deref()
        .unwrap_or_default()
        .contains("does not exist"));
    assert_eq!(count_rows(&conn, "plugin", "user-4"), 0);
}

#[test]
fn database_failure_rolls_back_plugin_row() {
    let source = plugin_source();
    let base = tempfile::tempdir().unwrap();
    let mut conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TRIGGER reject_module BEFORE INSERT ON module
         BEGIN SELECT RAISE(ABORT, 'module insert rejected'); END;",
    )
    .unwrap();

    let response = install_plugin_from("user-5", &mut conn, Some(base.path()), source.path());
    assert!(!response.success);
    assert!(response
        .error
        .as_deref()
        .unwrap_or_default()
        .contains("module insert rejected"));
    assert_eq!(count_rows(&conn, "plugin", "user-5"), 0);
    assert!(conn.is_autocommit());
}

#[test]
fn manager_tracks_active_users_across_install_and_delete() {
    let source = plugin_source();
    let base = tempfile::tempdir().unwrap();
    let mut conn = open_db_in_memory().unwrap();
    let mut manager =
        CollectionViewerLifecycleManager::new(Some(base.path()), source.path()).unwrap();

    manager.install_plugin("user-6", &mut conn).unwrap();
    assert!(manager.base().is_active("user-6"));

    let err = manager.install_plugin("user-6", &mut conn).unwrap_err();
    assert!(matches!(err, LifecycleError::AlreadyInstalled));

    let outcome = manager.delete_plugin("user-6", &mut conn).unwrap();
    assert_eq!(outcome.deleted_modules, 1);
    assert!(!manager.base().is_active("user-6"));

    let err = manager.delete_plugin("user-6", &mut conn).unwrap_err();
    assert!(matches!(err, LifecycleError::NotActive));
}

#[test]
fn restored_user_without_rows_reports_not_found() {
    let source = plugin_source();
    let mut conn = open_db_in_memory().unwrap();
    let mut manager = CollectionViewerLifecycleManager::new(None, source.path()).unwrap();

    assert!(!manager.restore_active_user("ghost", &mut conn).unwrap());
    assert!(!manager.base().is_active("ghost"));
}

#[test]
fn repository_finds_installed_plugin_summary() {
    let source = plugin_source();
    let base = tempfile::tempdir().unwrap();
    let mut conn = open_db_in_memory().unwrap();
    assert!(install_plugin_from("user-7", &mut conn, Some(base.path()), source.path()).success);

    let repo = SqlitePluginRepository::new(&mut conn);
    let found = repo
        .find_plugin("user-7", "CollectionViewer")
        .unwrap()
        .expect("plugin row");
    assert_eq!(found.id, "user-7_CollectionViewer");
    assert_eq!(found.version, "1.0.0");
    assert!(found.enabled);
    assert!(repo.find_plugin("user-8", "CollectionViewer").unwrap().is_none());
}

#[test]
fn install_without_base_dir_keeps_files_in_place() {
    let source = plugin_source();
    let mut conn = open_db_in_memory().unwrap();

    let response = install_plugin_from("user-9", &mut conn, None, source.path());
    assert!(response.success, "{:?}", response.error);
    assert_eq!(
        fs::read_to_string(source.path().join("dist/remoteEntry.js")).unwrap(),
        "var CollectionViewer;"
    );
    assert!(!source.path().join("shared").exists());
}

#[cfg(unix)]
#[test]
fn install_copies_symlinked_bundle_before_writing_rows() {
    let source = plugin_source();
    let build = tempfile::tempdir().unwrap();
    fs::write(build.path().join("remoteEntry.js"), "var Linked;").unwrap();
    fs::remove_file(source.path().join("dist/remoteEntry.js")).unwrap();
    std::os::unix::fs::symlink(
        build.path().join("remoteEntry.js"),
        source.path().join("dist/remoteEntry.js"),
    )
    .unwrap();
    let base = tempfile::tempdir().unwrap();
    let mut conn = open_db_in_memory().unwrap();

    let response = install_plugin_from("user-10", &mut conn, Some(base.path()), source.path());
    assert!(response.success, "{:?}", response.error);

    let shared = base.path().join("shared/CollectionViewer/v1.0.0");
    assert_eq!(
        fs::read_to_string(shared.join("dist/remoteEntry.js")).unwrap(),
        "var Linked;"
    );
    assert!(collection_viewer_core::validate_installation("user-10", &shared).valid);
}

#[cfg(unix)]
#[test]
fn install_with_dangling_bundle_link_writes_no_rows() {
    let source = plugin_source();
    fs::remove_file(source.path().join("dist/remoteEntry.js")).unwrap();
    std::os::unix::fs::symlink(
        source.path().join("gone.js"),
        source.path().join("dist/remoteEntry.js"),
    )
    .unwrap();
    let base = tempfile::tempdir().unwrap();
    let mut conn = open_db_in_memory().unwrap();

    let response = install_plugin_from("user-11", &mut conn, Some(base.path()), source.path());
    assert!(!response.success);
    assert_eq!(count_rows(&conn, "plugin", "user-11"), 0);
}
