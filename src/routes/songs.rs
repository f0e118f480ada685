use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Extension, Json,
};
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    middleware::{AuthUser, RequestId},
    models::AnnotatedSong,
    routes::AppState,
    services::{like_index, song_search},
};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    q: String,
}

/// Handler for the full catalog listing
pub async fn list(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    AuthUser(user): AuthUser,
) -> AppResult<Json<Vec<AnnotatedSong>>> {
    let songs = like_index::list_songs(state.store.as_ref(), user).await?;

    tracing::info!(request_id = %request_id, user_id = %user, count = songs.len(), "Listed songs");
    Ok(Json(songs))
}

/// Handler for the songs the user likes
pub async fn liked(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    AuthUser(user): AuthUser,
) -> AppResult<Json<Vec<AnnotatedSong>>> {
    let songs = like_index::liked_songs(state.store.as_ref(), user).await?;

    tracing::info!(request_id = %request_id, user_id = %user, count = songs.len(), "Listed liked songs");
    Ok(Json(songs))
}

/// Handler for song search
pub async fn search(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    AuthUser(user): AuthUser,
    params: Result<Query<SearchQuery>, QueryRejection>,
) -> AppResult<Json<Vec<AnnotatedSong>>> {
    let Query(params) = params.map_err(|e| AppError::InvalidInput(e.body_text()))?;
    let query = params.q.trim();
    let songs = song_search::search_songs(state.store.as_ref(), user, query).await?;

    tracing::info!(
        request_id = %request_id,
        user_id = %user,
        query = %query,
        count = songs.len(),
        "Searched songs"
    );
    Ok(Json(songs))
}
