//! Database manager implementation
//!
//! SQLite connection pool (r2d2) with an async wrapper around blocking
//! database work, transaction support, and a backup hook used before
//! migrating an existing database file.

use crate::core::error::{PanelError, Result};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::task;

/// Database manager with connection pool
pub struct DatabaseManager {
    pool: Pool<SqliteConnectionManager>,
    db_path: PathBuf,
}

impl DatabaseManager {
    /// Create a new DatabaseManager with the specified database path and pool size
    pub fn new(db_path: &Path, pool_size: u32, busy_timeout: Duration) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(PanelError::IoError)?;
        }

        let manager = SqliteConnectionManager::file(db_path).with_init(move |conn| {
            conn.execute_batch("PRAGMA foreign_keys = ON;")?;
            conn.busy_timeout(busy_timeout)?;
            // WAL mode for concurrent admin requests
            conn.execute_batch("PRAGMA journal_mode = WAL;")?;
            Ok(())
        });

        let pool = Pool::builder()
            .max_size(pool_size)
            .connection_timeout(Duration::from_secs(30))
            .build(manager)
            .map_err(|e| PanelError::InitializationError(format!(
                "Failed to build connection pool: {}",
                e
            )))?;

        Ok(Self {
            pool,
            db_path: db_path.to_path_buf(),
        })
    }

    /// Create a new DatabaseManager with an in-memory database for testing
    pub fn new_in_memory() -> Result<Self> {
        let manager = SqliteConnectionManager::memory().with_init(|conn| {
            conn.execute_batch("PRAGMA foreign_keys = ON;")?;
            Ok(())
        });

        // In-memory databases must use a single connection
        let pool = Pool::builder()
            .max_size(1)
            .connection_timeout(Duration::from_secs(30))
            .build(manager)
            .map_err(|e| PanelError::InitializationError(format!(
                "Failed to build connection pool: {}",
                e
            )))?;

        let manager = Self {
            pool,
            db_path: PathBuf::from(":memory:"),
        };

        manager.migrate()?;

        Ok(manager)
    }

    /// Get a connection from the pool
    pub fn get_connection(&self) -> Result<PooledConnection<SqliteConnectionManager>> {
        self.pool
            .get()
            .map_err(|e| PanelError::InitializationError(format!(
                "Failed to get database connection: {}",
                e
            )))
    }

    /// Execute a database operation asynchronously
    ///
    /// This wraps synchronous database operations in tokio::task::spawn_blocking
    /// to avoid blocking the async runtime.
    pub async fn execute<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();

        task::spawn_blocking(move || {
            let conn = pool.get().map_err(|e| {
                PanelError::InitializationError(format!(
                    "Failed to get database connection: {}",
                    e
                ))
            })?;
            f(&conn)
        })
        .await
        .map_err(|e| PanelError::TaskError(format!("Database task panicked: {}", e)))?
    }

    /// Execute a database operation within a transaction
    ///
    /// The transaction is automatically committed if the closure returns Ok,
    /// or rolled back if it returns Err.
    pub async fn transaction<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&rusqlite::Transaction) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();

        task::spawn_blocking(move || {
            let mut conn = pool.get().map_err(|e| {
                PanelError::InitializationError(format!(
                    "Failed to get database connection: {}",
                    e
                ))
            })?;

            let tx = conn.transaction().map_err(PanelError::DatabaseError)?;
            let result = f(&tx)?;
            tx.commit().map_err(PanelError::DatabaseError)?;

            Ok(result)
        })
        .await
        .map_err(|e| PanelError::TaskError(format!("Transaction task panicked: {}", e)))?
    }

    /// Execute database migrations
    ///
    /// An existing database file is backed up next to itself before any
    /// migration is applied, so a failed migration can be restored manually.
    pub fn migrate(&self) -> Result<()> {
        if self.db_path.is_file() {
            let backup_path = self.db_path.with_extension("db.bak");
            self.backup(&backup_path)?;
            tracing::info!(backup = %backup_path.display(), "Pre-migration backup created");
        }

        let mut conn = self.get_connection()?;
        crate::db::migrations::run_migrations(&mut conn)
    }

    /// Backup the database to the specified path
    ///
    /// Uses SQLite's online backup API, so the copy is consistent even with
    /// the pool open.
    pub fn backup(&self, backup_path: &Path) -> Result<()> {
        if let Some(parent) = backup_path.parent() {
            std::fs::create_dir_all(parent).map_err(PanelError::IoError)?;
        }

        let src_conn = self.get_connection()?;

        let mut dst_conn = Connection::open(backup_path).map_err(PanelError::DatabaseError)?;

        let backup = rusqlite::backup::Backup::new(&src_conn, &mut dst_conn)
            .map_err(PanelError::DatabaseError)?;

        backup
            .run_to_completion(5, Duration::from_millis(250), None)
            .map_err(PanelError::DatabaseError)?;

        Ok(())
    }

    /// Get the database file path
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Get the current pool size
    pub fn pool_size(&self) -> u32 {
        self.pool.max_size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_db() -> (DatabaseManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("registry.db");
        let manager = DatabaseManager::new(&db_path, 5, Duration::from_secs(5)).unwrap();
        manager.migrate().unwrap();
        (manager, temp_dir)
    }

    #[test]
    fn test_database_manager_creation() {
        let (manager, _temp_dir) = create_test_db();
        assert_eq!(manager.pool_size(), 5);
    }

    #[test]
    fn test_get_connection() {
        let (manager, _temp_dir) = create_test_db();
        assert!(manager.get_connection().is_ok());
    }

    #[tokio::test]
    async fn test_execute_async() {
        let (manager, _temp_dir) = create_test_db();

        let count: i64 = manager
            .execute(|conn| {
                conn.query_row("SELECT COUNT(*) FROM plugins", [], |row| row.get(0))
                    .map_err(PanelError::DatabaseError)
            })
            .await
            .unwrap();

        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_transaction_commit() {
        let (manager, _temp_dir) = create_test_db();

        let result = manager
            .transaction(|tx| {
                tx.execute(
                    "INSERT INTO plugins (alias, name) VALUES ('seo', 'SEO')",
                    [],
                )
                .map_err(PanelError::DatabaseError)?;
                Ok(())
            })
            .await;

        assert!(result.is_ok());

        let count: i64 = manager
            .execute(|conn| {
                conn.query_row("SELECT COUNT(*) FROM plugins", [], |row| row.get(0))
                    .map_err(PanelError::DatabaseError)
            })
            .await
            .unwrap();

        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_transaction_rollback() {
        let (manager, _temp_dir) = create_test_db();

        let result: Result<()> = manager
            .transaction(|tx| {
                tx.execute(
                    "INSERT INTO plugins (alias, name) VALUES ('seo', 'SEO')",
                    [],
                )
                .map_err(PanelError::DatabaseError)?;
                // Simulate error
                Err(PanelError::InvalidRequest("test error".into()))
            })
            .await;

        assert!(result.is_err());

        let count: i64 = manager
            .execute(|conn| {
                conn.query_row("SELECT COUNT(*) FROM plugins", [], |row| row.get(0))
                    .map_err(PanelError::DatabaseError)
            })
            .await
            .unwrap();

        assert_eq!(count, 0);
    }

    #[test]
    fn test_backup() {
        let (manager, temp_dir) = create_test_db();

        let conn = manager.get_connection().unwrap();
        conn.execute(
            "INSERT INTO plugins (alias, name) VALUES ('seo', 'SEO')",
            [],
        )
        .unwrap();
        drop(conn);

        let backup_path = temp_dir.path().join("backup.db");
        manager.backup(&backup_path).unwrap();

        let backup_conn = Connection::open(&backup_path).unwrap();
        let count: i64 = backup_conn
            .query_row("SELECT COUNT(*) FROM plugins", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_migrate_existing_file_creates_backup() {
        let (manager, temp_dir) = create_test_db();

        // Second migrate on an existing file must leave a backup behind
        manager.migrate().unwrap();
        assert!(temp_dir.path().join("registry.db.bak").exists());
    }
}
