//! Custom vocabulary endpoints
//!
//! The same handlers serve brands, types and colors; the router binds each
//! set of routes to one `VocabularyKind`.

use axum::{
    extract::State,
    routing::{get, put},
    Json, Router,
};
use serde::Serialize;

use crate::domain::{merge_choices, Choice, NewEntry, RenameEntry, VocabularyEntry, VocabularyKind};

use super::error::ApiResult;
use super::extract::{ApiJson, ApiPath};
use super::filament_api::MessageResponse;
use super::AppState;

#[derive(Debug, Serialize)]
pub struct CreatedEntryResponse {
    #[serde(flatten)]
    pub entry: VocabularyEntry,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameResponse {
    pub message: String,
    pub filaments_updated: usize,
}

/// Plural path segment for a kind: `brands`, `types`, `colors`
fn collection(kind: VocabularyKind) -> &'static str {
    match kind {
        VocabularyKind::Brand => "brands",
        VocabularyKind::Type => "types",
        VocabularyKind::Color => "colors",
    }
}

/// `/custom-<kind>`, `/custom-<kind>/:name` and `/choices/<kind>`
pub fn routes(kind: VocabularyKind) -> Router<AppState> {
    let plural = collection(kind);

    Router::new()
        .route(
            &format!("/custom-{}", plural),
            get(move |state: State<AppState>| list_entries(state, kind)).post(
                move |state: State<AppState>, body: ApiJson<NewEntry>| create_entry(state, kind, body),
            ),
        )
        .route(
            &format!("/custom-{}/:name", plural),
            put(
                move |state: State<AppState>, name: ApiPath<String>, body: ApiJson<RenameEntry>| {
                    rename_entry(state, kind, name, body)
                },
            )
            .delete(move |state: State<AppState>, name: ApiPath<String>| {
                delete_entry(state, kind, name)
            }),
        )
        .route(
            &format!("/choices/{}", plural),
            get(move |state: State<AppState>| list_choices(state, kind)),
        )
}

pub async fn list_entries(
    State(state): State<AppState>,
    kind: VocabularyKind,
) -> ApiResult<Json<Vec<VocabularyEntry>>> {
    Ok(Json(state.vocabulary.list(kind).await?))
}

pub async fn create_entry(
    State(state): State<AppState>,
    kind: VocabularyKind,
    ApiJson(body): ApiJson<NewEntry>,
) -> ApiResult<Json<CreatedEntryResponse>> {
    let fields = body.validate(kind)?;
    let entry = state.vocabulary.create(kind, &fields).await?;

    Ok(Json(CreatedEntryResponse {
        entry,
        message: format!("Custom {} added successfully", kind.label()),
    }))
}

/// Rename an entry, cascading to every filament that used the old name
pub async fn rename_entry(
    State(state): State<AppState>,
    kind: VocabularyKind,
    ApiPath(name): ApiPath<String>,
    ApiJson(body): ApiJson<RenameEntry>,
) -> ApiResult<Json<RenameResponse>> {
    let fields = body.validate(kind)?;
    let filaments_updated = state.vocabulary.rename(kind, &name, &fields).await?;

    Ok(Json(RenameResponse {
        message: format!("Custom {} updated successfully", kind.label()),
        filaments_updated,
    }))
}

/// Delete an entry; refused while filaments still use it
pub async fn delete_entry(
    State(state): State<AppState>,
    kind: VocabularyKind,
    ApiPath(name): ApiPath<String>,
) -> ApiResult<Json<MessageResponse>> {
    state.vocabulary.delete(kind, &name).await?;

    Ok(Json(MessageResponse {
        message: format!("Custom {} deleted successfully", kind.label()),
    }))
}

/// Presets merged with custom entries, for dropdowns
pub async fn list_choices(
    State(state): State<AppState>,
    kind: VocabularyKind,
) -> ApiResult<Json<Vec<Choice>>> {
    let custom = state.vocabulary.list(kind).await?;
    Ok(Json(merge_choices(kind, &custom)))
}
