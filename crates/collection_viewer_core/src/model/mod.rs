//! Row shapes written to the host `plugin` and `module` tables.
//!
//! # Invariants
//! - Plugin rows are keyed `{user_id}_{plugin_slug}`.
//! - Module rows are keyed `{user_id}_{plugin_slug}_{module_name}` and point
//!   at their plugin row through `plugin_id`.

pub mod record;
