//! Repository pattern implementation for data access layer
//!
//! This module provides the Repository pattern for abstracting registry
//! database operations.

use crate::core::error::{PanelError, Result};
use crate::db::manager::DatabaseManager;
use crate::db::models::{DiscoveredPlugin, PluginRecord};
use rusqlite::{OptionalExtension, Row};
use std::sync::Arc;

const PLUGIN_COLUMNS: &str =
    "alias, name, description, author, version, enabled, installed, created_at, updated_at";

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<PluginRecord> {
    Ok(PluginRecord {
        alias: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        author: row.get(3)?,
        version: row.get(4)?,
        enabled: row.get(5)?,
        installed: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

/// Repository for plugin registry rows
pub struct PluginRepository {
    db: Arc<DatabaseManager>,
}

impl PluginRepository {
    /// Create a new PluginRepository
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }

    /// Find a plugin by its alias
    pub async fn find_by_alias(&self, alias: &str) -> Result<Option<PluginRecord>> {
        let alias = alias.to_string();
        self.db
            .execute(move |conn| {
                conn.query_row(
                    &format!("SELECT {} FROM plugins WHERE alias = ?", PLUGIN_COLUMNS),
                    [&alias],
                    row_to_record,
                )
                .optional()
                .map_err(PanelError::DatabaseError)
            })
            .await
    }

    /// Find all plugins, ordered by display name
    pub async fn find_all(&self) -> Result<Vec<PluginRecord>> {
        self.db
            .execute(|conn| {
                let mut stmt = conn
                    .prepare(&format!(
                        "SELECT {} FROM plugins ORDER BY name, alias",
                        PLUGIN_COLUMNS
                    ))
                    .map_err(PanelError::DatabaseError)?;

                let plugins = stmt
                    .query_map([], row_to_record)
                    .map_err(PanelError::DatabaseError)?
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(PanelError::DatabaseError)?;

                Ok(plugins)
            })
            .await
    }

    /// Set the enabled flag for a plugin
    ///
    /// The UPDATE is idempotent; writing the current value is not an error.
    pub async fn set_enabled(&self, alias: &str, enabled: bool) -> Result<()> {
        self.set_flag(alias, "enabled", enabled).await
    }

    /// Set the installed flag for a plugin
    pub async fn set_installed(&self, alias: &str, installed: bool) -> Result<()> {
        self.set_flag(alias, "installed", installed).await
    }

    async fn set_flag(&self, alias: &str, column: &'static str, value: bool) -> Result<()> {
        let alias = alias.to_string();
        self.db
            .execute(move |conn| {
                let changed = conn
                    .execute(
                        &format!(
                            "UPDATE plugins SET {} = ?, updated_at = ? WHERE alias = ?",
                            column
                        ),
                        rusqlite::params![value, chrono::Utc::now().to_rfc3339(), alias],
                    )
                    .map_err(PanelError::DatabaseError)?;

                if changed == 0 {
                    return Err(PanelError::PluginNotFound(alias));
                }

                Ok(())
            })
            .await
    }

    /// Sync discovered plugins into the registry inside one transaction
    ///
    /// New aliases are inserted with both flags off; known aliases only get
    /// their display metadata refreshed. Rows are never deleted here —
    /// removal is a discovery-layer concern.
    ///
    /// Returns the number of newly inserted plugins.
    pub async fn sync(&self, discovered: Vec<DiscoveredPlugin>) -> Result<usize> {
        self.db
            .transaction(move |tx| {
                let mut inserted = 0;
                let now = chrono::Utc::now().to_rfc3339();

                for plugin in &discovered {
                    let exists: bool = tx
                        .query_row(
                            "SELECT EXISTS(SELECT 1 FROM plugins WHERE alias = ?)",
                            [&plugin.alias],
                            |row| row.get(0),
                        )
                        .map_err(PanelError::DatabaseError)?;
                    if !exists {
                        inserted += 1;
                    }

                    tx.execute(
                        "INSERT INTO plugins \
                         (alias, name, description, author, version, created_at, updated_at) \
                         VALUES (?, ?, ?, ?, ?, ?, ?) \
                         ON CONFLICT(alias) DO UPDATE SET \
                         name = excluded.name, \
                         description = excluded.description, \
                         author = excluded.author, \
                         version = excluded.version, \
                         updated_at = excluded.updated_at",
                        rusqlite::params![
                            plugin.alias,
                            plugin.name,
                            plugin.description,
                            plugin.author,
                            plugin.version,
                            now,
                            now,
                        ],
                    )
                    .map_err(PanelError::DatabaseError)?;
                }

                Ok(inserted)
            })
            .await
    }
}
