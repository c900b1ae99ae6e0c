//! Static plugin declarations.
//!
//! This module holds the plugin/module metadata shapes, the permission
//! vocabulary they may declare, and the bundled CollectionViewer definition.

pub mod collection_viewer;
pub mod metadata;
pub mod permission;
