//! Database migrations
//!
//! Schema migrations are applied in order and tracked in the
//! `schema_migrations` table.

use crate::core::error::{PanelError, Result};
use rusqlite::Connection;
use tracing::info;

/// Migration version tracking table
const MIGRATION_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    applied_at DATETIME DEFAULT CURRENT_TIMESTAMP
)
"#;

/// Initial schema migration (version 1)
const MIGRATION_V1: &str = r#"
-- Plugin registry table
CREATE TABLE IF NOT EXISTS plugins (
    alias TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT,
    author TEXT,
    version TEXT,
    enabled INTEGER NOT NULL DEFAULT 0,
    installed INTEGER NOT NULL DEFAULT 0,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
    updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
);

-- Indexes for performance
CREATE INDEX IF NOT EXISTS idx_plugins_enabled ON plugins(enabled);
CREATE INDEX IF NOT EXISTS idx_plugins_name ON plugins(name);
"#;

/// Run all pending database migrations
pub fn run_migrations(conn: &mut Connection) -> Result<()> {
    info!("Running database migrations");

    // Create migration tracking table
    conn.execute_batch(MIGRATION_TABLE)
        .map_err(PanelError::DatabaseError)?;

    // Check current version
    let current_version: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .map_err(PanelError::DatabaseError)?;

    info!("Current database schema version: {}", current_version);

    if current_version < 1 {
        info!("Applying migration v1: Plugin registry");
        apply_migration(conn, 1, MIGRATION_V1)?;
    }

    Ok(())
}

/// Apply a single migration inside a transaction and record its version
fn apply_migration(conn: &mut Connection, version: i64, sql: &str) -> Result<()> {
    let tx = conn.transaction().map_err(PanelError::DatabaseError)?;

    tx.execute_batch(sql).map_err(PanelError::DatabaseError)?;
    tx.execute(
        "INSERT INTO schema_migrations (version) VALUES (?)",
        [version],
    )
    .map_err(PanelError::DatabaseError)?;

    tx.commit().map_err(PanelError::DatabaseError)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_migrated() -> Connection {
        let mut conn = Connection::open_in_memory().unwrap();
        run_migrations(&mut conn).unwrap();
        conn
    }

    #[test]
    fn test_migrations_create_plugins_table() {
        let conn = open_migrated();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'plugins'",
                [],
                |row| row.get(0),
            )
            .unwrap();

        assert_eq!(count, 1);
    }

    #[test]
    fn test_migrations_record_version() {
        let conn = open_migrated();

        let version: i64 = conn
            .query_row(
                "SELECT MAX(version) FROM schema_migrations",
                [],
                |row| row.get(0),
            )
            .unwrap();

        assert_eq!(version, 1);
    }

    #[test]
    fn test_migrations_are_idempotent() {
        let mut conn = open_migrated();

        // A second run must not re-apply or fail
        run_migrations(&mut conn).unwrap();

        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_migrations", [], |row| row.get(0))
            .unwrap();

        assert_eq!(rows, 1);
    }

    #[test]
    fn test_new_rows_default_to_disabled_uninstalled() {
        let conn = open_migrated();

        conn.execute(
            "INSERT INTO plugins (alias, name) VALUES ('seo', 'SEO')",
            [],
        )
        .unwrap();

        let (enabled, installed): (bool, bool) = conn
            .query_row(
                "SELECT enabled, installed FROM plugins WHERE alias = 'seo'",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();

        assert!(!enabled);
        assert!(!installed);
    }
}
