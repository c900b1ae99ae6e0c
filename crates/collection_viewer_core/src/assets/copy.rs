//! Copies the plugin's bundled files into the per-user shared path.
//!
//! # Invariants
//! - Paths with an excluded component (`node_modules`, `.git`, ...) or an
//!   excluded suffix are never copied.
//! - The lifecycle entry file is copied last, after the walk.
//! - A single unreadable entry is skipped with a warning; only root-level
//!   failures and failures on required bundle files abort the copy.
//! - Nothing is copied when source and target resolve to the same directory.

use crate::assets::validate::REQUIRED_FILES;
use log::{info, warn};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Path components never copied into shared storage.
pub const EXCLUDED_NAMES: &[&str] = &[
    "node_modules",
    "package-lock.json",
    ".git",
    ".gitignore",
    "__pycache__",
    ".DS_Store",
];
/// File name suffixes never copied into shared storage.
pub const EXCLUDED_SUFFIXES: &[&str] = &[".pyc"];
/// Host-facing lifecycle entry file shipped alongside the bundle.
pub const LIFECYCLE_ENTRY_FILE: &str = "lifecycle_manager.py";

#[derive(Debug, Error)]
pub enum CopyError {
    #[error("plugin source directory does not exist: {}", .0.display())]
    SourceMissing(PathBuf),
    #[error("failed to create `{}`: {source}", path.display())]
    CreateDir { path: PathBuf, source: io::Error },
    #[error("failed to copy `{}`: {source}", path.display())]
    CopyFile { path: PathBuf, source: io::Error },
}

/// Files written by one copy run, as `/`-separated paths relative to the target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyReport {
    pub copied_files: Vec<String>,
}

/// Returns whether a source-relative path should be copied.
pub fn should_copy(relative: &Path) -> bool {
    let excluded_component = relative.components().any(|component| match component {
        Component::Normal(part) => part
            .to_str()
            .is_some_and(|part| EXCLUDED_NAMES.contains(&part)),
        _ => false,
    });
    if excluded_component {
        return false;
    }

    let name = relative
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();
    !EXCLUDED_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

/// Copies every non-excluded file from `source_dir` into `target_dir`.
///
/// With `update = true` existing target files are removed before copying.
/// Symlinks are followed and their targets' contents copied; link loops and
/// dangling links are logged and skipped.
pub fn copy_plugin_files(
    source_dir: &Path,
    target_dir: &Path,
    update: bool,
) -> Result<CopyReport, CopyError> {
    if !source_dir.is_dir() {
        return Err(CopyError::SourceMissing(source_dir.to_path_buf()));
    }
    fs::create_dir_all(target_dir).map_err(|source| CopyError::CreateDir {
        path: target_dir.to_path_buf(),
        source,
    })?;

    let source_root = canonical(source_dir);
    let target_root = canonical(target_dir);
    if source_root == target_root {
        info!(
            "event=files_copy module=assets status=skipped reason=same_directory target={}",
            target_dir.display()
        );
        return Ok(CopyReport::default());
    }

    let mut report = CopyReport::default();
    let walker = WalkDir::new(source_dir)
        .min_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            // Target nested in the source must not be walked into.
            if canonical(entry.path()) == target_root {
                return false;
            }
            entry
                .path()
                .strip_prefix(source_dir)
                .map(should_copy)
                .unwrap_or(false)
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let required = err
                    .path()
                    .filter(|path| is_required(source_dir, path))
                    .map(Path::to_path_buf);
                if let Some(path) = required {
                    return Err(CopyError::CopyFile {
                        path,
                        source: io::Error::from(err),
                    });
                }
                warn!("event=file_copy module=assets status=skipped error={err}");
                continue;
            }
        };
        let Ok(relative) = entry.path().strip_prefix(source_dir) else {
            continue;
        };
        if entry.depth() == 1 && relative == Path::new(LIFECYCLE_ENTRY_FILE) {
            continue;
        }

        let target = target_dir.join(relative);
        let result = if entry.file_type().is_dir() {
            // Directories on the way down to a nested target are only created
            // when a file beneath them is copied.
            if target_root.starts_with(canonical(entry.path())) {
                Ok(())
            } else {
                fs::create_dir_all(&target)
            }
        } else if entry.file_type().is_file() {
            copy_one(entry.path(), &target, update).map(|()| {
                report.copied_files.push(display_relative(relative));
            })
        } else {
            warn!(
                "event=file_copy module=assets status=skipped reason=not_a_file path={}",
                relative.display()
            );
            Ok(())
        };

        if let Err(err) = result {
            if is_required(source_dir, entry.path()) {
                return Err(CopyError::CopyFile {
                    path: entry.path().to_path_buf(),
                    source: err,
                });
            }
            warn!(
                "event=file_copy module=assets status=skipped path={} error={err}",
                relative.display()
            );
        }
    }

    let entry_source = source_dir.join(LIFECYCLE_ENTRY_FILE);
    if entry_source.is_file() {
        let entry_target = target_dir.join(LIFECYCLE_ENTRY_FILE);
        copy_one(&entry_source, &entry_target, update).map_err(|source| {
            CopyError::CopyFile {
                path: entry_source.clone(),
                source,
            }
        })?;
        report.copied_files.push(LIFECYCLE_ENTRY_FILE.to_string());
    }

    info!(
        "event=files_copy module=assets status=ok files={} target={}",
        report.copied_files.len(),
        target_dir.display()
    );
    Ok(report)
}

fn copy_one(source: &Path, target: &Path, update: bool) -> io::Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    if update && target.exists() {
        fs::remove_file(target)?;
    }
    fs::copy(source, target)?;
    Ok(())
}

fn is_required(source_dir: &Path, path: &Path) -> bool {
    path.strip_prefix(source_dir)
        .is_ok_and(|relative| REQUIRED_FILES.iter().any(|file| relative == Path::new(file)))
}

fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

fn display_relative(relative: &Path) -> String {
    relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
