//! The shelf's SQLite file.
//!
//! The CLI and the RPC server may open the same file at once, so every
//! connection waits on a busy database instead of failing immediately.

use std::fs;
use std::path::Path;
use std::time::Duration;

use rusqlite::Connection;

use super::migrations;
use crate::types::errors::BookmarkError;

/// How long a statement waits for another process's write lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Owns the connection and guarantees the schema is current.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens or creates the database file, creating missing parent
    /// directories, and migrates it.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, BookmarkError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                BookmarkError::DatabaseError(format!("cannot create {}: {}", parent.display(), e))
            })?;
        }

        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let db = Self::migrated(conn)?;
        tracing::info!(
            path = %path.display(),
            schema = migrations::get_schema_version(&db.conn),
            "bookmark database open"
        );
        Ok(db)
    }

    /// Throwaway database for tests and dry runs.
    pub fn open_in_memory() -> Result<Self, BookmarkError> {
        Self::migrated(Connection::open_in_memory()?)
    }

    fn migrated(conn: Connection) -> Result<Self, BookmarkError> {
        migrations::run_all(&conn)?;
        Ok(Self { conn })
    }

    /// Managers borrow this to run their queries.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}
