//! Filament Repository Implementation
//!
//! SQLite-backed implementation of Repository<Filament>, plus the active/used
//! split and the usage operation that drives spools into the archive.

use async_trait::async_trait;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};

use crate::domain::{
    is_used_up, matches_query, DomainError, DomainResult, Filament, FilamentDraft, SpoolType,
    Usage,
};
use super::db::{from_millis, not_initialized, now_millis, SharedConnection};
use super::traits::{Repository, SearchableRepository};

pub(super) const FILAMENT_COLUMNS: &str = "id, brand, type, color, spool_type, weight_remaining, \
     purchase_date, notes, is_archived, created_at, updated_at";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// SQLite implementation of Filament repository
pub struct FilamentRepository {
    conn: SharedConnection,
}

impl FilamentRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    /// Spools that are not used up, newest first
    pub async fn list_active(&self) -> DomainResult<Vec<Filament>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;
        query_filaments(
            conn,
            &format!(
                "SELECT {} FROM filaments WHERE is_archived = 0 ORDER BY created_at DESC, id DESC",
                FILAMENT_COLUMNS
            ),
            [],
        )
    }

    /// Used-up spools, most recently finished first
    pub async fn list_used(&self) -> DomainResult<Vec<Filament>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;
        query_filaments(
            conn,
            &format!(
                "SELECT {} FROM filaments WHERE is_archived = 1 ORDER BY updated_at DESC, id DESC",
                FILAMENT_COLUMNS
            ),
            [],
        )
    }

    /// Record filament usage against an active spool
    ///
    /// A spool whose weight reaches zero is archived in the same write.
    pub async fn apply_usage(&self, id: i64, usage: &Usage) -> DomainResult<Filament> {
        usage.validate()?;

        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let existing = select_one(conn, id)?
            .ok_or_else(|| DomainError::NotFound(format!("Filament {} not found", id)))?;
        if existing.is_archived {
            return Err(DomainError::InvalidInput(format!(
                "Filament {} is already used up",
                id
            )));
        }

        let weight = usage.next_weight(existing.weight_remaining);
        let archived = is_used_up(weight);

        conn.execute(
            "UPDATE filaments SET weight_remaining = ?1, is_archived = ?2, updated_at = ?3 WHERE id = ?4",
            params![weight, archived, now_millis(), id],
        )
        .map_err(DomainError::internal)?;

        if archived {
            log::info!("Filament {} used up, moved to archive", id);
        } else {
            log::debug!("Filament {} now at {}g", id, weight);
        }

        select_one(conn, id)?
            .ok_or_else(|| DomainError::NotFound(format!("Filament {} not found", id)))
    }
}

#[async_trait]
impl Repository<Filament> for FilamentRepository {
    type Draft = FilamentDraft;

    async fn create(&self, draft: &FilamentDraft) -> DomainResult<Filament> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let now = now_millis();
        conn.execute(
            "INSERT INTO filaments (brand, type, color, spool_type, weight_remaining, purchase_date, notes, is_archived, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, ?8, ?8)",
            params![
                draft.brand,
                draft.filament_type,
                draft.color,
                draft.spool_type.as_str(),
                draft.weight_remaining,
                draft.purchase_date.map(|d| d.format(DATE_FORMAT).to_string()),
                draft.notes,
                now,
            ],
        )
        .map_err(DomainError::internal)?;

        let id = conn.last_insert_rowid();
        log::debug!("Created filament {}", id);

        select_one(conn, id)?
            .ok_or_else(|| DomainError::Internal(format!("Filament {} vanished after insert", id)))
    }

    async fn find_by_id(&self, id: i64) -> DomainResult<Option<Filament>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;
        select_one(conn, id)
    }

    async fn list(&self) -> DomainResult<Vec<Filament>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;
        query_filaments(
            conn,
            &format!(
                "SELECT {} FROM filaments ORDER BY created_at DESC, id DESC",
                FILAMENT_COLUMNS
            ),
            [],
        )
    }

    async fn update(&self, id: i64, draft: &FilamentDraft) -> DomainResult<Filament> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let existing = select_one(conn, id)?
            .ok_or_else(|| DomainError::NotFound(format!("Filament {} not found", id)))?;

        // Archiving is one-way
        if existing.is_archived && draft.weight_remaining > 0.0 {
            return Err(DomainError::InvalidInput(format!(
                "Filament {} is used up; its weight cannot be raised",
                id
            )));
        }
        let archived = existing.is_archived || is_used_up(draft.weight_remaining);

        conn.execute(
            "UPDATE filaments
             SET brand = ?1, type = ?2, color = ?3, spool_type = ?4, weight_remaining = ?5,
                 purchase_date = ?6, notes = ?7, is_archived = ?8, updated_at = ?9
             WHERE id = ?10",
            params![
                draft.brand,
                draft.filament_type,
                draft.color,
                draft.spool_type.as_str(),
                draft.weight_remaining,
                draft.purchase_date.map(|d| d.format(DATE_FORMAT).to_string()),
                draft.notes,
                archived,
                now_millis(),
                id,
            ],
        )
        .map_err(DomainError::internal)?;

        select_one(conn, id)?
            .ok_or_else(|| DomainError::NotFound(format!("Filament {} not found", id)))
    }

    async fn delete(&self, id: i64) -> DomainResult<()> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let changes = conn
            .execute("DELETE FROM filaments WHERE id = ?1", params![id])
            .map_err(DomainError::internal)?;
        if changes == 0 {
            return Err(DomainError::NotFound(format!("Filament {} not found", id)));
        }

        log::debug!("Deleted filament {}", id);
        Ok(())
    }
}

#[async_trait]
impl SearchableRepository<Filament> for FilamentRepository {
    /// Case-insensitive substring search over the active collection
    async fn search(&self, query: &str) -> DomainResult<Vec<Filament>> {
        let active = self.list_active().await?;
        Ok(active
            .into_iter()
            .filter(|f| matches_query(f, query))
            .collect())
    }
}

fn select_one(conn: &Connection, id: i64) -> DomainResult<Option<Filament>> {
    let mut stmt = conn
        .prepare(&format!("SELECT {} FROM filaments WHERE id = ?1", FILAMENT_COLUMNS))
        .map_err(DomainError::internal)?;

    stmt.query_row(params![id], |row| Ok(row_to_filament(row)))
        .optional()
        .map_err(DomainError::internal)?
        .transpose()
}

/// Run a query selecting `FILAMENT_COLUMNS`
pub(super) fn query_filaments(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> DomainResult<Vec<Filament>> {
    let mut stmt = conn.prepare(sql).map_err(DomainError::internal)?;
    let mut rows = stmt.query(params).map_err(DomainError::internal)?;

    let mut filaments = Vec::new();
    while let Some(row) = rows.next().map_err(DomainError::internal)? {
        filaments.push(row_to_filament(row)?);
    }
    Ok(filaments)
}

/// Convert a database row to Filament
fn row_to_filament(row: &rusqlite::Row) -> DomainResult<Filament> {
    let spool_type: String = row.get(4).map_err(DomainError::internal)?;
    let purchase_date: Option<String> = row.get(6).map_err(DomainError::internal)?;

    Ok(Filament {
        id: row.get(0).map_err(DomainError::internal)?,
        brand: row.get(1).map_err(DomainError::internal)?,
        filament_type: row.get(2).map_err(DomainError::internal)?,
        color: row.get(3).map_err(DomainError::internal)?,
        spool_type: SpoolType::parse(&spool_type)
            .ok_or_else(|| DomainError::Internal(format!("Unknown spool type '{}'", spool_type)))?,
        weight_remaining: row.get(5).map_err(DomainError::internal)?,
        purchase_date: purchase_date
            .map(|d| NaiveDate::parse_from_str(&d, DATE_FORMAT))
            .transpose()
            .map_err(DomainError::internal)?,
        notes: row.get(7).map_err(DomainError::internal)?,
        is_archived: row.get(8).map_err(DomainError::internal)?,
        created_at: from_millis(row.get(9).map_err(DomainError::internal)?)?,
        updated_at: from_millis(row.get(10).map_err(DomainError::internal)?)?,
    })
}
