use crate::db::models::PluginRecord;
use crate::plugin::actions::{available_actions, ModuleAction};
use serde::{Deserialize, Serialize};

// Plugin listing API models

/// Query body for the data-table listing endpoint
#[derive(Debug, Default, Deserialize)]
pub struct ListingQuery {
    /// Request counter echoed back for the table widget
    pub draw: Option<u64>,
    /// Offset of the first row to return
    pub start: Option<usize>,
    /// Page size; omitted means all remaining rows
    pub length: Option<usize>,
    /// Case-insensitive filter over alias, name and description
    pub search: Option<String>,
}

/// One row of the plugin listing
#[derive(Debug, Serialize)]
pub struct ModuleRow {
    pub alias: String,
    pub name: String,
    /// Description composited with author and version lines
    pub description: String,
    /// Actions currently legal for this plugin, in display order
    pub actions: Vec<ModuleAction>,
}

impl ModuleRow {
    /// Build a listing row from a registry snapshot
    pub fn from_record(record: &PluginRecord) -> Self {
        Self {
            alias: record.alias.clone(),
            name: record.name.clone(),
            description: composite_description(record),
            actions: available_actions(record),
        }
    }
}

/// Description column content: description plus author and version lines
fn composite_description(record: &PluginRecord) -> String {
    format!(
        "{}\n\nAuthor: {}\nVersion: {}",
        record.description.as_deref().unwrap_or(""),
        record.author.as_deref().unwrap_or(""),
        record.version_or_placeholder()
    )
}

/// Table payload for the listing endpoints
#[derive(Debug, Serialize)]
pub struct ListingResponse {
    pub draw: u64,
    pub records_total: usize,
    pub records_filtered: usize,
    pub data: Vec<ModuleRow>,
}

/// Response for a status change, carrying the updated row
#[derive(Debug, Serialize)]
pub struct StatusChangeResponse {
    pub message: String,
    pub error: bool,
    pub data: ModuleRow,
}
