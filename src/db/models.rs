//! Database models
//!
//! Data structures representing database tables

use serde::{Deserialize, Serialize};

/// Plugin record in the registry
///
/// `alias` is the stable primary key; it is the only identifier accepted by
/// lifecycle actions. Rows are created by discovery and never deleted here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginRecord {
    pub alias: String,
    pub name: String,
    pub description: Option<String>,
    pub author: Option<String>,
    pub version: Option<String>,
    /// Plugin participates in the running system
    pub enabled: bool,
    /// Plugin dependencies have been materialized
    pub installed: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl PluginRecord {
    /// Version string for display, with the listing placeholder when absent
    pub fn version_or_placeholder(&self) -> &str {
        self.version.as_deref().unwrap_or("...")
    }
}

/// Metadata captured from an on-disk module manifest during discovery
///
/// Carries only display metadata; the enabled/installed flags belong to the
/// registry and are never part of a discovery payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredPlugin {
    pub alias: String,
    pub name: String,
    pub description: Option<String>,
    pub author: Option<String>,
    pub version: Option<String>,
}
