use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

use crate::{
    error::{AppError, AppResult},
    middleware::{AuthUser, RequestId},
    models::{MessageResponse, SongId},
    routes::AppState,
    services::likes,
};

fn parse_song_id(raw: &str) -> AppResult<SongId> {
    raw.parse::<SongId>().map_err(AppError::InvalidInput)
}

/// Handler for liking a song. 201 when the like is new, 200 when it already existed.
pub async fn like(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    AuthUser(user): AuthUser,
    Path(song_id): Path<String>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    let song_id = parse_song_id(&song_id)?;
    let outcome = likes::like_song(state.store.as_ref(), user, song_id).await?;

    tracing::info!(
        request_id = %request_id,
        user_id = %user,
        song_id = %song_id,
        outcome = ?outcome,
        "Like request handled"
    );

    Ok((
        outcome.status(),
        Json(MessageResponse {
            message: outcome.message(),
        }),
    ))
}

/// Handler for unliking a song. Always 200; the message says whether a like was removed.
pub async fn unlike(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    AuthUser(user): AuthUser,
    Path(song_id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let song_id = parse_song_id(&song_id)?;
    let outcome = likes::unlike_song(state.store.as_ref(), user, song_id).await?;

    tracing::info!(
        request_id = %request_id,
        user_id = %user,
        song_id = %song_id,
        outcome = ?outcome,
        "Unlike request handled"
    );

    Ok(Json(MessageResponse {
        message: outcome.message(),
    }))
}
