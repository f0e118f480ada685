use axum::{extract::State, Extension, Json};

use crate::{
    error::AppResult,
    middleware::{AuthUser, RequestId},
    models::AnnotatedSong,
    routes::AppState,
    services::recommendations,
};

/// Handler for recommendations endpoint
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    AuthUser(user): AuthUser,
) -> AppResult<Json<Vec<AnnotatedSong>>> {
    let songs = recommendations::get_recommendations(state.store.as_ref(), user).await?;

    tracing::info!(
        request_id = %request_id,
        user_id = %user,
        count = songs.len(),
        "Recommendations computed"
    );
    Ok(Json(songs))
}
