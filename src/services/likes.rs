use crate::{
    db::CatalogStore,
    error::{AppError, AppResult},
    models::{LikeOutcome, SongId, UnlikeOutcome, UserId},
};

async fn ensure_song_exists(store: &dyn CatalogStore, song: SongId) -> AppResult<()> {
    match store.get_song(song).await? {
        Some(_) => Ok(()),
        None => Err(AppError::NotFound(format!("Song {} does not exist", song))),
    }
}

/// Likes a song for the user
///
/// Liking an already liked song is not an error; the store's unique insert
/// decides which of two racing calls created the like.
pub async fn like_song(
    store: &dyn CatalogStore,
    user: UserId,
    song: SongId,
) -> AppResult<LikeOutcome> {
    ensure_song_exists(store, song).await?;

    let outcome = if store.insert_like(user, song).await? {
        LikeOutcome::Created
    } else {
        LikeOutcome::AlreadyLiked
    };

    tracing::debug!(user_id = %user, song_id = %song, outcome = ?outcome, "Like processed");
    Ok(outcome)
}

/// Removes the user's like of a song, if any
pub async fn unlike_song(
    store: &dyn CatalogStore,
    user: UserId,
    song: SongId,
) -> AppResult<UnlikeOutcome> {
    ensure_song_exists(store, song).await?;

    let outcome = if store.delete_like(user, song).await? {
        UnlikeOutcome::Removed
    } else {
        UnlikeOutcome::NotLiked
    };

    tracing::debug!(user_id = %user, song_id = %song, outcome = ?outcome, "Unlike processed");
    Ok(outcome)
}
