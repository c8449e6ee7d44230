//! Filament endpoints
//!
//! Spool CRUD, the active/used split, search, filtering, usage and stats.

use axum::{extract::Query, extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::domain::{
    DomainError, Filament, FilamentFilter, FilamentInput, InventoryStats, Usage, UsedStats,
};
use crate::repository::{Repository, SearchableRepository};

use super::error::{ApiError, ApiResult};
use super::extract::{ApiJson, ApiPath};
use super::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: i64,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct UpdatedResponse {
    pub message: String,
    pub filament: Filament,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// List all filaments, newest first
pub async fn list_filaments(State(state): State<AppState>) -> ApiResult<Json<Vec<Filament>>> {
    Ok(Json(state.filaments.list().await?))
}

/// List spools still in stock
pub async fn list_active(State(state): State<AppState>) -> ApiResult<Json<Vec<Filament>>> {
    Ok(Json(state.filaments.list_active().await?))
}

/// List used-up spools
pub async fn list_used(State(state): State<AppState>) -> ApiResult<Json<Vec<Filament>>> {
    Ok(Json(state.filaments.list_used().await?))
}

/// Substring search over active spools
pub async fn search_filaments(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<Vec<Filament>>> {
    let query = params
        .q
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Search query required".to_string()))?;

    Ok(Json(state.filaments.search(query.trim()).await?))
}

/// Apply a structured filter to the active spools
pub async fn filter_filaments(
    State(state): State<AppState>,
    ApiJson(filter): ApiJson<FilamentFilter>,
) -> ApiResult<Json<Vec<Filament>>> {
    let active = state.filaments.list_active().await?;
    Ok(Json(filter.apply(active)))
}

pub async fn inventory_stats(State(state): State<AppState>) -> ApiResult<Json<InventoryStats>> {
    let active = state.filaments.list_active().await?;
    Ok(Json(InventoryStats::from_filaments(&active)))
}

pub async fn used_stats(State(state): State<AppState>) -> ApiResult<Json<UsedStats>> {
    let used = state.filaments.list_used().await?;
    Ok(Json(UsedStats::from_filaments(&used)))
}

/// Get filament by ID
pub async fn get_filament(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Filament>> {
    let filament = state
        .filaments
        .find_by_id(id)
        .await?
        .ok_or_else(|| DomainError::NotFound("Filament not found".to_string()))?;
    Ok(Json(filament))
}

/// Add a spool to the inventory
pub async fn create_filament(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<FilamentInput>,
) -> ApiResult<Json<CreatedResponse>> {
    let draft = input.into_draft()?;
    let filament = state.filaments.create(&draft).await?;

    Ok(Json(CreatedResponse {
        id: filament.id,
        message: "Filament added successfully".to_string(),
    }))
}

/// Replace a spool's fields
pub async fn update_filament(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<FilamentInput>,
) -> ApiResult<Json<UpdatedResponse>> {
    let draft = input.into_draft()?;
    let filament = state.filaments.update(id, &draft).await?;

    Ok(Json(UpdatedResponse {
        message: "Filament updated successfully".to_string(),
        filament,
    }))
}

pub async fn delete_filament(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<MessageResponse>> {
    state.filaments.delete(id).await?;
    Ok(Json(MessageResponse {
        message: "Filament deleted successfully".to_string(),
    }))
}

/// Record usage; returns the spool as stored afterwards
pub async fn use_filament(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(usage): ApiJson<Usage>,
) -> ApiResult<Json<Filament>> {
    Ok(Json(state.filaments.apply_usage(id, &usage).await?))
}
