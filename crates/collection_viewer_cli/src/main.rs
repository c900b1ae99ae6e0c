//! Command-line driver for the CollectionViewer lifecycle.
//!
//! # Responsibility
//! - Run install/uninstall/validate/health against a standalone SQLite session.
//! - Print every result as JSON so the host or an operator can inspect it.

use clap::{Parser, Subcommand};
use collection_viewer_core::db::open_db;
use collection_viewer_core::{
    collection_viewer_manifest, delete_plugin_from, init_logging, install_plugin_from,
    plugin_health, validate_installation, CollectionViewerLifecycleManager, LifecycleConfig,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "collection-viewer", version, about = "CollectionViewer plugin lifecycle")]
struct Cli {
    /// SQLite database used as the host session.
    #[arg(long, global = true, env = "COLLECTION_VIEWER_DB_PATH")]
    db: Option<PathBuf>,
    /// Base directory holding `shared/<slug>/v<version>`.
    #[arg(long, global = true, env = "COLLECTION_VIEWER_PLUGINS_DIR")]
    plugins_dir: Option<PathBuf>,
    /// Directory holding the plugin's bundled files.
    #[arg(long, global = true, env = "COLLECTION_VIEWER_SOURCE_DIR")]
    source_dir: Option<PathBuf>,
    #[arg(long, global = true, env = "COLLECTION_VIEWER_LOG_LEVEL")]
    log_level: Option<String>,
    /// Absolute directory for rolling log files; logging is off when unset.
    #[arg(long, global = true, env = "COLLECTION_VIEWER_LOG_DIR")]
    log_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Copy files and create plugin/module rows for a user.
    Install {
        #[arg(long)]
        user: String,
    },
    /// Delete a user's plugin/module rows.
    Uninstall {
        #[arg(long)]
        user: String,
    },
    /// Check required files and package.json of an installed directory.
    Validate {
        #[arg(long)]
        user: String,
        /// Directory to check; defaults to the shared storage path.
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Report bundle and package.json health of an installed directory.
    Health {
        #[arg(long)]
        user: String,
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Print the plugin and module metadata.
    Metadata,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = resolve_config(&cli);

    if let Some(log_dir) = config.log_dir.as_deref() {
        if let Err(err) = init_logging(&config.log_level, &log_dir.to_string_lossy()) {
            eprintln!("logging disabled: {err}");
        }
    }

    match run(cli.command, &config) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

/// Returns whether the command reported success.
fn run(command: Command, config: &LifecycleConfig) -> Result<bool, String> {
    let plugins_dir = config.plugins_base_dir.as_deref();
    match command {
        Command::Install { user } => {
            let mut conn = open_session(&config.db_path)?;
            let response = install_plugin_from(&user, &mut conn, plugins_dir, &config.source_dir);
            print_json(&response)?;
            Ok(response.success)
        }
        Command::Uninstall { user } => {
            let mut conn = open_session(&config.db_path)?;
            let response = delete_plugin_from(&user, &mut conn, plugins_dir, &config.source_dir);
            print_json(&response)?;
            Ok(response.success)
        }
        Command::Validate { user, dir } => {
            let dir = installed_dir(dir, config)?;
            let report = validate_installation(&user, &dir);
            print_json(&report)?;
            Ok(report.valid)
        }
        Command::Health { user, dir } => {
            let dir = installed_dir(dir, config)?;
            let report = plugin_health(&user, &dir);
            print_json(&report)?;
            Ok(report.healthy)
        }
        Command::Metadata => {
            print_json(&collection_viewer_manifest())?;
            Ok(true)
        }
    }
}

fn resolve_config(cli: &Cli) -> LifecycleConfig {
    let mut config = LifecycleConfig::from_env();
    if let Some(db) = &cli.db {
        config.db_path = db.clone();
    }
    if let Some(dir) = &cli.plugins_dir {
        config.plugins_base_dir = Some(dir.clone());
    }
    if let Some(dir) = &cli.source_dir {
        config.source_dir = dir.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(dir) = &cli.log_dir {
        config.log_dir = Some(dir.clone());
    }
    config
}

fn open_session(path: &Path) -> Result<rusqlite::Connection, String> {
    open_db(path).map_err(|err| format!("failed to open database `{}`: {err}", path.display()))
}

fn installed_dir(dir: Option<PathBuf>, config: &LifecycleConfig) -> Result<PathBuf, String> {
    if let Some(dir) = dir {
        return Ok(dir);
    }
    let manager = CollectionViewerLifecycleManager::new(
        config.plugins_base_dir.as_deref(),
        config.source_dir.clone(),
    )
    .map_err(|err| err.to_string())?;
    Ok(manager.shared_path().to_path_buf())
}

fn print_json(value: &impl Serialize) -> Result<(), String> {
    let text = serde_json::to_string_pretty(value).map_err(|err| err.to_string())?;
    println!("{text}");
    Ok(())
}
