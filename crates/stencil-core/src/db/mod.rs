//! SQLite storage behind the template and directory stores.
//!
//! One connection is shared by every store. Submitted templates keep their
//! steps, variables and share grants as JSON text columns; users and roles
//! are plain rows. Async callers go through `with_conn_async`, which runs
//! the query on the blocking pool.

use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::error::StoreError;

/// Cloneable handle shared by `TemplateStore` and `DirectoryStore`.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open the template database at `db_path`, creating the file, its
    /// directory and the schema on first use.
    pub fn open(db_path: &str) -> Result<Self, StoreError> {
        if let Some(dir) = Path::new(db_path).parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| {
                StoreError::Database(format!("Failed to create {}: {}", dir.display(), e))
            })?;
        }

        let conn = Connection::open(db_path)
            .map_err(|e| StoreError::Database(format!("Failed to open database: {}", e)))?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .map_err(|e| StoreError::Database(format!("Failed to set pragmas: {}", e)))?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.initialize_tables()?;

        tracing::info!("SQLite database opened at: {}", db_path);
        Ok(db)
    }

    /// Throwaway database for tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StoreError::Database(format!("Failed to open in-memory db: {}", e)))?;

        conn.execute_batch("PRAGMA foreign_keys=ON;")
            .map_err(|e| StoreError::Database(format!("Failed to set pragmas: {}", e)))?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.initialize_tables()?;
        Ok(db)
    }

    /// Run `f` against the shared connection, holding the lock for its duration.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Connection) -> Result<T, rusqlite::Error>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| StoreError::Database(format!("Lock poisoned: {}", e)))?;
        f(&conn).map_err(|e| StoreError::Database(e.to_string()))
    }

    /// `with_conn` on the blocking pool.
    pub async fn with_conn_async<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Connection) -> Result<T, rusqlite::Error> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.clone();
        tokio::task::spawn_blocking(move || db.with_conn(f))
            .await
            .map_err(|e| StoreError::Database(format!("Task join error: {}", e)))?
    }

    /// Templates, users and roles. Safe to run on every open.
    fn initialize_tables(&self) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            conn.execute_batch(
                "
                CREATE TABLE IF NOT EXISTS templates (
                    id              TEXT PRIMARY KEY,
                    name            TEXT NOT NULL,
                    description     TEXT,
                    visibility      TEXT NOT NULL DEFAULT 'private',
                    shared_users    TEXT NOT NULL DEFAULT '[]',
                    shared_roles    TEXT NOT NULL DEFAULT '[]',
                    variables       TEXT NOT NULL DEFAULT '[]',
                    steps           TEXT NOT NULL DEFAULT '[]',
                    created_at      INTEGER NOT NULL,
                    updated_at      INTEGER NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_templates_created ON templates(created_at);

                CREATE TABLE IF NOT EXISTS users (
                    id              TEXT PRIMARY KEY,
                    email           TEXT NOT NULL UNIQUE
                );

                CREATE TABLE IF NOT EXISTS roles (
                    id              TEXT PRIMARY KEY,
                    name            TEXT NOT NULL
                );
                ",
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_creates_schema() {
        let db = Database::open_in_memory().unwrap();
        let tables: Vec<String> = db
            .with_conn(|conn| {
                let mut stmt =
                    conn.prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")?;
                let names = stmt.query_map([], |row| row.get(0))?.collect::<Result<Vec<_>, _>>()?;
                Ok(names)
            })
            .unwrap();
        assert_eq!(tables, vec!["roles", "templates", "users"]);
    }

    #[test]
    fn test_open_fails_when_directory_cannot_be_created() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        let path = blocker.join("stencil.db");

        let err = Database::open(&path.to_string_lossy()).err().unwrap();
        assert!(matches!(err, StoreError::Database(_)));
    }
}
