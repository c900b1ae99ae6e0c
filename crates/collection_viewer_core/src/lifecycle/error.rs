//! Error type shared by lifecycle operations.
//!
//! Display strings are what the host sees in failure results.

use crate::assets::copy::CopyError;
use crate::plugin::metadata::MetadataValidationError;
use crate::repo::plugin_repo::RepoError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type LifecycleResult<T> = Result<T, LifecycleError>;

#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The active-user set already contains the user.
    #[error("Plugin already installed for user")]
    AlreadyActive,
    /// The active-user set does not contain the user.
    #[error("Plugin not installed for user")]
    NotActive,
    /// A plugin row for the user already exists.
    #[error("Plugin already installed")]
    AlreadyInstalled,
    /// No plugin row exists for the user.
    #[error("Plugin not found for user")]
    NotFoundForUser,
    #[error("invalid plugin metadata: {0}")]
    Metadata(#[from] MetadataValidationError),
    #[error("failed to create shared directory `{}`: {source}", path.display())]
    SharedDir { path: PathBuf, source: io::Error },
    #[error(transparent)]
    Copy(#[from] CopyError),
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}
