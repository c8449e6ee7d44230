//! API Layer
//!
//! axum handlers that bridge HTTP clients to the repositories.

mod error;
mod extract;
mod filament_api;
mod health_api;
mod vocabulary_api;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::domain::VocabularyKind;
use crate::repository::{DbState, FilamentRepository, VocabularyRepository};

pub use error::{ApiError, ApiResult, ErrorResponse};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub filaments: Arc<FilamentRepository>,
    pub vocabulary: Arc<VocabularyRepository>,
    pub db: DbState,
}

impl AppState {
    pub fn new(db: DbState) -> Self {
        Self {
            filaments: Arc::new(FilamentRepository::new(db.shared())),
            vocabulary: Arc::new(VocabularyRepository::new(db.shared())),
            db,
        }
    }
}

/// Create the API router: data routes under `/api`, `/health` at the root
pub fn create_router(state: AppState) -> Router {
    let mut api = Router::new()
        .route(
            "/filaments",
            get(filament_api::list_filaments).post(filament_api::create_filament),
        )
        .route("/filaments/active", get(filament_api::list_active))
        .route("/filaments/used", get(filament_api::list_used))
        .route("/filaments/used/stats", get(filament_api::used_stats))
        .route("/filaments/search", get(filament_api::search_filaments))
        .route("/filaments/filter", post(filament_api::filter_filaments))
        .route("/filaments/stats", get(filament_api::inventory_stats))
        .route(
            "/filaments/:id",
            get(filament_api::get_filament)
                .put(filament_api::update_filament)
                .delete(filament_api::delete_filament),
        )
        .route("/filaments/:id/use", post(filament_api::use_filament));

    for kind in VocabularyKind::ALL {
        api = api.merge(vocabulary_api::routes(kind));
    }

    Router::new()
        .route("/health", get(health_api::health_check))
        .nest("/api", api)
        .with_state(state)
}

/// Router plus tracing, CORS and the optional static bundle
pub fn build_app(state: AppState, config: &Config) -> Router {
    let mut router = create_router(state);

    if let Some(dir) = &config.static_dir {
        let index = dir.join("index.html");
        router = router.fallback_service(ServeDir::new(dir).not_found_service(ServeFile::new(index)));
    }

    router = router.layer(TraceLayer::new_for_http());

    if !config.no_cors {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    router
}
