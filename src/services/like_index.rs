use std::collections::HashSet;

use crate::{
    db::{CatalogStore, LikeSnapshot, SongScope},
    error::AppResult,
    models::{AnnotatedSong, Song, SongId, UserId},
};

/// Marks each song with whether it is in the user's liked set
///
/// The liked set is read once per listing, so this is a single pass over the
/// songs with a hash lookup each.
pub fn annotate(songs: Vec<Song>, liked: &HashSet<SongId>) -> Vec<AnnotatedSong> {
    songs
        .into_iter()
        .map(|song| AnnotatedSong {
            liked: liked.contains(&song.id),
            song,
        })
        .collect()
}

impl LikeSnapshot {
    pub fn annotate(self) -> Vec<AnnotatedSong> {
        annotate(self.songs, &self.liked)
    }
}

/// Reads `scope` for the user and annotates it
pub async fn annotated_songs(
    store: &dyn CatalogStore,
    user: UserId,
    scope: &SongScope,
) -> AppResult<Vec<AnnotatedSong>> {
    let snapshot = store.songs_with_likes(user, scope).await?;
    tracing::debug!(
        user_id = %user,
        songs = snapshot.songs.len(),
        liked = snapshot.liked.len(),
        "Annotating songs"
    );
    Ok(snapshot.annotate())
}

/// Full catalog with the user's like state
pub async fn list_songs(store: &dyn CatalogStore, user: UserId) -> AppResult<Vec<AnnotatedSong>> {
    annotated_songs(store, user, &SongScope::All).await
}

/// Songs the user likes, most recently liked first
pub async fn liked_songs(store: &dyn CatalogStore, user: UserId) -> AppResult<Vec<AnnotatedSong>> {
    annotated_songs(store, user, &SongScope::Liked).await
}
