use axum::{
    http::StatusCode,
    middleware,
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    db::CatalogStore,
    middleware::{request_id::make_span_with_request_id, request_id_middleware},
};

pub mod likes;
pub mod recommendations;
pub mod songs;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CatalogStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }
}

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1/music", music_routes())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
}

/// Catalog routes under /api/v1/music
fn music_routes() -> Router<AppState> {
    Router::new()
        .route("/list", get(songs::list))
        .route("/liked", get(songs::liked))
        .route("/search", get(songs::search))
        .route("/recommend", get(recommendations::recommend))
        .route("/like/:song_id", post(likes::like))
        .route("/unlike/:song_id", delete(likes::unlike))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
