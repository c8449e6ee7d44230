//! Vocabulary Repository
//!
//! Custom brands, types and colors. Filaments refer to entries by name, so a
//! rename rewrites the matching filament column in the same transaction and a
//! delete is refused while any filament still uses the name.

use rusqlite::{params, Connection};

use crate::domain::{
    DomainError, DomainResult, EntryFields, Filament, VocabularyEntry, VocabularyKind,
};
use super::db::{from_millis, not_initialized, now_millis, SharedConnection};
use super::filament_repo::{query_filaments, FILAMENT_COLUMNS};

pub struct VocabularyRepository {
    conn: SharedConnection,
}

impl VocabularyRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    /// List entries of one kind, sorted by name
    pub async fn list(&self, kind: VocabularyKind) -> DomainResult<Vec<VocabularyEntry>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let mut stmt = conn
            .prepare(&format!(
                "SELECT id, name, {}, created_at FROM {} ORDER BY name",
                hex_column(kind),
                kind.table()
            ))
            .map_err(DomainError::internal)?;
        let mut rows = stmt.query([]).map_err(DomainError::internal)?;

        let mut entries = Vec::new();
        while let Some(row) = rows.next().map_err(DomainError::internal)? {
            entries.push(row_to_entry(row)?);
        }
        Ok(entries)
    }

    /// Find an entry by exact name
    pub async fn find(&self, kind: VocabularyKind, name: &str) -> DomainResult<Option<VocabularyEntry>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;
        select_entry(conn, kind, name)
    }

    /// Add a custom entry; duplicate names are a conflict
    pub async fn create(&self, kind: VocabularyKind, fields: &EntryFields) -> DomainResult<VocabularyEntry> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let now = now_millis();
        let result = if kind.requires_hex() {
            conn.execute(
                &format!("INSERT INTO {} (name, hex_code, created_at) VALUES (?1, ?2, ?3)", kind.table()),
                params![fields.name, fields.hex_code, now],
            )
        } else {
            conn.execute(
                &format!("INSERT INTO {} (name, created_at) VALUES (?1, ?2)", kind.table()),
                params![fields.name, now],
            )
        };
        result.map_err(|e| write_error(kind, e))?;

        log::debug!("Created custom {} '{}'", kind.label(), fields.name);

        Ok(VocabularyEntry {
            id: conn.last_insert_rowid(),
            name: fields.name.clone(),
            hex_code: fields.hex_code.clone(),
            created_at: from_millis(now)?,
        })
    }

    /// Rename an entry and every filament that uses the old name
    ///
    /// Both writes happen in one transaction. Returns the number of filaments
    /// rewritten. Renaming onto another existing entry is a conflict.
    pub async fn rename(
        &self,
        kind: VocabularyKind,
        old_name: &str,
        fields: &EntryFields,
    ) -> DomainResult<usize> {
        let mut guard = self.conn.lock().await;
        let conn = guard.as_mut().ok_or_else(not_initialized)?;

        let tx = conn.transaction().map_err(DomainError::internal)?;

        if select_entry(&tx, kind, old_name)?.is_none() {
            return Err(DomainError::NotFound(format!("Custom {} not found", kind.label())));
        }
        if fields.name != old_name && select_entry(&tx, kind, &fields.name)?.is_some() {
            return Err(DomainError::Conflict(format!(
                "{} '{}' already exists",
                kind.title(),
                fields.name
            )));
        }

        let result = if kind.requires_hex() {
            tx.execute(
                &format!("UPDATE {} SET name = ?1, hex_code = ?2 WHERE name = ?3", kind.table()),
                params![fields.name, fields.hex_code, old_name],
            )
        } else {
            tx.execute(
                &format!("UPDATE {} SET name = ?1 WHERE name = ?2", kind.table()),
                params![fields.name, old_name],
            )
        };
        result.map_err(|e| write_error(kind, e))?;

        let column = kind.filament_column();
        let updated = tx
            .execute(
                &format!(
                    "UPDATE filaments SET {col} = ?1, updated_at = ?2 WHERE {col} = ?3",
                    col = column
                ),
                params![fields.name, now_millis(), old_name],
            )
            .map_err(DomainError::internal)?;

        tx.commit().map_err(DomainError::internal)?;

        log::info!(
            "Renamed custom {} '{}' to '{}', {} filaments updated",
            kind.label(),
            old_name,
            fields.name,
            updated
        );
        Ok(updated)
    }

    /// Delete an entry unless a filament still uses its name
    pub async fn delete(&self, kind: VocabularyKind, name: &str) -> DomainResult<()> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        if select_entry(conn, kind, name)?.is_none() {
            return Err(DomainError::NotFound(format!("Custom {} not found", kind.label())));
        }

        let blockers = referencing_filaments(conn, kind, name)?;
        if !blockers.is_empty() {
            log::info!(
                "Refused to delete custom {} '{}': {} filaments use it",
                kind.label(),
                name,
                blockers.len()
            );
            return Err(DomainError::InUse(
                format!("Custom {} '{}' is used by {} filaments", kind.label(), name, blockers.len()),
                blockers,
            ));
        }

        conn.execute(
            &format!("DELETE FROM {} WHERE name = ?1", kind.table()),
            params![name],
        )
        .map_err(DomainError::internal)?;

        log::debug!("Deleted custom {} '{}'", kind.label(), name);
        Ok(())
    }
}

/// Brand and type tables have no hex column
fn hex_column(kind: VocabularyKind) -> &'static str {
    if kind.requires_hex() {
        "hex_code"
    } else {
        "NULL"
    }
}

fn select_entry(conn: &Connection, kind: VocabularyKind, name: &str) -> DomainResult<Option<VocabularyEntry>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT id, name, {}, created_at FROM {} WHERE name = ?1",
            hex_column(kind),
            kind.table()
        ))
        .map_err(DomainError::internal)?;
    let mut rows = stmt.query(params![name]).map_err(DomainError::internal)?;

    match rows.next().map_err(DomainError::internal)? {
        Some(row) => Ok(Some(row_to_entry(row)?)),
        None => Ok(None),
    }
}

/// Filaments (active or used up) whose field equals `name`
fn referencing_filaments(conn: &Connection, kind: VocabularyKind, name: &str) -> DomainResult<Vec<Filament>> {
    query_filaments(
        conn,
        &format!(
            "SELECT {} FROM filaments WHERE {} = ?1 ORDER BY created_at DESC, id DESC",
            FILAMENT_COLUMNS,
            kind.filament_column()
        ),
        params![name],
    )
}

fn write_error(kind: VocabularyKind, e: rusqlite::Error) -> DomainError {
    match e {
        rusqlite::Error::SqliteFailure(err, _) if err.code == rusqlite::ErrorCode::ConstraintViolation => {
            DomainError::Conflict(format!("{} already exists", kind.title()))
        }
        other => DomainError::internal(other),
    }
}

/// Convert a database row to VocabularyEntry
fn row_to_entry(row: &rusqlite::Row) -> DomainResult<VocabularyEntry> {
    Ok(VocabularyEntry {
        id: row.get(0).map_err(DomainError::internal)?,
        name: row.get(1).map_err(DomainError::internal)?,
        hex_code: row.get(2).map_err(DomainError::internal)?,
        created_at: from_millis(row.get(3).map_err(DomainError::internal)?)?,
    })
}
