//! SQLite storage bootstrap for the `plugin` and `module` tables.
//!
//! # Responsibility
//! - Open and configure SQLite connections used as the host session.
//! - Apply the reference schema when running standalone or under test.
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version`.
//! - Lifecycle code must not touch plugin rows before migrations succeed.

use thiserror::Error;

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    #[error("database schema version {db_version} is newer than supported {latest_supported}")]
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}
