//! Database Connection and Setup
//!
//! Manages the SQLite connection and migrations.

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::domain::{DomainError, DomainResult};

/// Connection shared by all repositories; `None` once closed
pub type SharedConnection = Arc<Mutex<Option<Connection>>>;

/// Database state wrapper
#[derive(Clone)]
pub struct DbState {
    pub conn: SharedConnection,
    pub path: PathBuf,
}

impl DbState {
    pub fn new(conn: Connection, path: PathBuf) -> Self {
        Self {
            conn: Arc::new(Mutex::new(Some(conn))),
            path,
        }
    }

    /// Handle for constructing repositories
    pub fn shared(&self) -> SharedConnection {
        self.conn.clone()
    }

    pub async fn is_open(&self) -> bool {
        self.conn.lock().await.is_some()
    }

    /// Close the connection; later operations fail as not initialized
    pub async fn close(&self) -> DomainResult<()> {
        let mut guard = self.conn.lock().await;
        if let Some(conn) = guard.take() {
            conn.close().map_err(|(_, e)| DomainError::internal(e))?;
            log::info!("Database connection closed");
        }
        Ok(())
    }
}

pub(crate) fn not_initialized() -> DomainError {
    DomainError::Internal("Database not initialized".to_string())
}

/// Current time truncated to what the store keeps
pub(crate) fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

pub(crate) fn from_millis(ms: i64) -> DomainResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| DomainError::Internal(format!("Invalid timestamp {}", ms)))
}

/// Initialize database with path (`:memory:` for a private in-memory store)
pub async fn init_db(db_path: &Path) -> DomainResult<DbState> {
    let in_memory = db_path.as_os_str() == ":memory:";

    if !in_memory {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| DomainError::Internal(format!("Failed to create {}: {}", parent.display(), e)))?;
        }
    }

    let conn = if in_memory {
        Connection::open_in_memory()
    } else {
        Connection::open(db_path)
    }
    .map_err(|e| DomainError::Internal(format!("Failed to open database: {}", e)))?;

    conn.busy_timeout(Duration::from_secs(5))
        .map_err(DomainError::internal)?;

    run_migrations(&conn)?;
    log::info!("Connected to SQLite database at {}", db_path.display());

    Ok(DbState::new(conn, db_path.to_path_buf()))
}

/// Check if a column exists in a table
fn column_exists(conn: &Connection, table: &str, column: &str) -> DomainResult<bool> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({})", table))
        .map_err(DomainError::internal)?;
    let mut rows = stmt.query([]).map_err(DomainError::internal)?;

    while let Some(row) = rows.next().map_err(DomainError::internal)? {
        let name: String = row.get(1).map_err(DomainError::internal)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Run database migrations
fn run_migrations(conn: &Connection) -> DomainResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS filaments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            brand TEXT NOT NULL,
            type TEXT NOT NULL,
            color TEXT NOT NULL,
            spool_type TEXT NOT NULL CHECK(spool_type IN ('refill', 'with_spool')),
            weight_remaining REAL NOT NULL DEFAULT 1000,
            purchase_date TEXT,
            notes TEXT,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS custom_brands (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT UNIQUE NOT NULL,
            created_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS custom_types (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT UNIQUE NOT NULL,
            created_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS custom_colors (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT UNIQUE NOT NULL,
            hex_code TEXT NOT NULL,
            created_at INTEGER NOT NULL
        );",
    )
    .map_err(|e| DomainError::Internal(format!("Failed to create tables: {}", e)))?;

    normalize_legacy_rows(conn)?;

    // Spools that reached zero before archiving existed count as used up
    if !column_exists(conn, "filaments", "is_archived")? {
        conn.execute_batch(
            "ALTER TABLE filaments ADD COLUMN is_archived INTEGER NOT NULL DEFAULT 0;
             UPDATE filaments SET is_archived = 1 WHERE weight_remaining <= 0;",
        )
        .map_err(|e| DomainError::Internal(format!("Failed to add is_archived: {}", e)))?;
        log::info!("Added is_archived column to filaments");
    }

    conn.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_filaments_brand ON filaments(brand);
         CREATE INDEX IF NOT EXISTS idx_filaments_type ON filaments(type);
         CREATE INDEX IF NOT EXISTS idx_filaments_color ON filaments(color);
         CREATE INDEX IF NOT EXISTS idx_filaments_archived ON filaments(is_archived);",
    )
    .map_err(|e| DomainError::Internal(format!("Failed to create indexes: {}", e)))?;

    Ok(())
}

/// Bring rows written by the earlier schema into the current representation
///
/// That schema stored timestamps as `CURRENT_TIMESTAMP` text, allowed a NULL
/// weight, and could hold an empty purchase date. Rows already in shape are
/// left untouched, so this is safe to run on every start.
fn normalize_legacy_rows(conn: &Connection) -> DomainResult<()> {
    let now = now_millis();

    for table in ["filaments", "custom_brands", "custom_types", "custom_colors"] {
        let mut columns = vec!["created_at"];
        if table == "filaments" {
            columns.push("updated_at");
        }
        for column in columns {
            conn.execute(
                &format!(
                    "UPDATE {table} SET {col} = COALESCE(CAST(strftime('%s', {col}) AS INTEGER) * 1000, ?1)
                     WHERE typeof({col}) = 'text' OR {col} IS NULL",
                    table = table,
                    col = column
                ),
                [now],
            )
            .map_err(|e| DomainError::Internal(format!("Failed to convert {}.{}: {}", table, column, e)))?;
        }
    }

    conn.execute_batch(
        "UPDATE filaments SET weight_remaining = 0 WHERE weight_remaining IS NULL;
         UPDATE filaments SET purchase_date = NULL WHERE trim(purchase_date) = '';",
    )
    .map_err(|e| DomainError::Internal(format!("Failed to normalize filaments: {}", e)))?;

    Ok(())
}
