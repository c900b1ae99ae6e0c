//! Reference schema for the host's `plugin` and `module` tables.
//!
//! The host owns the production schema; these steps mirror the columns the
//! lifecycle manager writes so it can run standalone and under test.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::{Connection, TransactionBehavior};

struct SchemaStep {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const SCHEMA_STEPS: &[SchemaStep] = &[SchemaStep {
    version: 1,
    name: "plugin_module",
    sql: include_str!("0001_plugin_module.sql"),
}];

/// Schema version this build writes into `PRAGMA user_version`.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |step| step.version)
}

/// Brings the schema up to [`latest_version`], returning how many steps ran.
///
/// A database stamped with a newer version is refused untouched.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<usize> {
    let stamped: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    let latest = latest_version();
    if stamped > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: stamped,
            latest_supported: latest,
        });
    }

    let pending: Vec<&SchemaStep> = SCHEMA_STEPS
        .iter()
        .filter(|step| step.version > stamped)
        .collect();
    if pending.is_empty() {
        return Ok(0);
    }

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    for step in &pending {
        tx.execute_batch(step.sql)?;
        tx.pragma_update(None, "user_version", step.version)?;
        info!(
            "event=schema_migrate module=db status=ok version={} name={}",
            step.version, step.name
        );
    }
    tx.commit()?;
    Ok(pending.len())
}
