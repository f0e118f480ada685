use std::cmp::Ordering;

use crate::{
    db::{CatalogStore, RecommendationSnapshot},
    error::AppResult,
    models::{AnnotatedSong, Song, UserId},
    services::like_index,
};

/// Recommends songs to a user from the genres they already like
///
/// Candidates are every song in a liked genre that the user has not liked yet,
/// ordered by how many likes their genre has across all users and then by
/// newest song first. A user with no likes gets no recommendations.
pub async fn get_recommendations(
    store: &dyn CatalogStore,
    user: UserId,
) -> AppResult<Vec<AnnotatedSong>> {
    let snapshot = store.recommendation_snapshot(user).await?;

    tracing::debug!(
        user_id = %user,
        liked_genres = snapshot.liked_genres.len(),
        genre_songs = snapshot.genre_songs.len(),
        "Ranking recommendations"
    );

    Ok(rank(snapshot))
}

/// Orders the candidates in a snapshot. Deterministic for a given snapshot.
pub fn rank(snapshot: RecommendationSnapshot) -> Vec<AnnotatedSong> {
    let RecommendationSnapshot {
        liked_genres,
        genre_songs,
        genre_like_counts,
        liked,
    } = snapshot;

    if liked_genres.is_empty() {
        return Vec::new();
    }

    let mut candidates: Vec<(i64, Song)> = genre_songs
        .into_iter()
        .filter(|song| liked_genres.contains(&song.genre) && !liked.contains(&song.id))
        .map(|song| {
            let genre_likes = genre_like_counts.get(&song.genre).copied().unwrap_or(0);
            (genre_likes, song)
        })
        .collect();

    candidates.sort_by(|(likes_a, a), (likes_b, b)| {
        by_popularity_then_newest(*likes_a, a, *likes_b, b)
    });

    let songs = candidates.into_iter().map(|(_, song)| song).collect();
    like_index::annotate(songs, &liked)
}

fn by_popularity_then_newest(likes_a: i64, a: &Song, likes_b: i64, b: &Song) -> Ordering {
    likes_b.cmp(&likes_a).then_with(|| b.id.cmp(&a.id))
}
