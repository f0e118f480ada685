use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;

use super::{CatalogStore, LikeSnapshot, RecommendationSnapshot, SongScope};
use crate::{
    error::AppResult,
    models::{Like, NewSong, Song, SongId, UserId},
};

/// In-process catalog store
///
/// Reads take the read lock once, so every snapshot sees a single state of the
/// likes table. Like and unlike hold the write lock for the check-and-mutate.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<MemoryStoreInner>>,
}

#[derive(Default)]
struct MemoryStoreInner {
    songs: BTreeMap<SongId, Song>,
    /// Likes keyed by user, then by song
    likes: HashMap<UserId, HashMap<SongId, Like>>,
    last_id: i64,
}

impl MemoryStoreInner {
    fn liked_by(&self, user: UserId) -> HashSet<SongId> {
        self.likes
            .get(&user)
            .map(|likes| likes.keys().copied().collect())
            .unwrap_or_default()
    }

    fn liked_songs(&self, user: UserId) -> Vec<Song> {
        let Some(likes) = self.likes.get(&user) else {
            return Vec::new();
        };

        let mut likes: Vec<&Like> = likes.values().collect();
        likes.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.song_id.cmp(&a.song_id))
        });

        likes
            .into_iter()
            .filter_map(|like| self.songs.get(&like.song_id))
            .cloned()
            .collect()
    }
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

/// Case-insensitive substring match of any term against title or artist
fn matches_any(song: &Song, lowered_terms: &[String]) -> bool {
    let title = song.title.to_lowercase();
    let artist = song.artist_name.to_lowercase();
    lowered_terms
        .iter()
        .any(|term| title.contains(term.as_str()) || artist.contains(term.as_str()))
}

#[async_trait::async_trait]
impl CatalogStore for MemoryStore {
    async fn get_song(&self, id: SongId) -> AppResult<Option<Song>> {
        let inner = self.inner.read().await;
        Ok(inner.songs.get(&id).cloned())
    }

    async fn insert_song(&self, song: NewSong) -> AppResult<Song> {
        let mut inner = self.inner.write().await;
        inner.last_id += 1;
        let song = song.into_song(SongId(inner.last_id));
        inner.songs.insert(song.id, song.clone());
        Ok(song)
    }

    async fn songs_with_likes(&self, user: UserId, scope: &SongScope) -> AppResult<LikeSnapshot> {
        let inner = self.inner.read().await;

        let songs = match scope {
            SongScope::All => inner.songs.values().cloned().collect(),
            SongScope::Liked => inner.liked_songs(user),
            SongScope::Matching(terms) => {
                let lowered: Vec<String> = terms.iter().map(|t| t.to_lowercase()).collect();
                inner
                    .songs
                    .values()
                    .filter(|song| matches_any(song, &lowered))
                    .cloned()
                    .collect()
            }
        };

        Ok(LikeSnapshot {
            songs,
            liked: inner.liked_by(user),
        })
    }

    async fn recommendation_snapshot(&self, user: UserId) -> AppResult<RecommendationSnapshot> {
        let inner = self.inner.read().await;

        let liked = inner.liked_by(user);
        let liked_genres: HashSet<String> = liked
            .iter()
            .filter_map(|id| inner.songs.get(id))
            .map(|song| song.genre.clone())
            .collect();

        if liked_genres.is_empty() {
            return Ok(RecommendationSnapshot::default());
        }

        let genre_songs = inner
            .songs
            .values()
            .filter(|song| liked_genres.contains(&song.genre))
            .cloned()
            .collect();

        let mut genre_like_counts: HashMap<String, i64> = HashMap::new();
        for song_id in inner.likes.values().flat_map(|likes| likes.keys()) {
            if let Some(song) = inner.songs.get(song_id) {
                if liked_genres.contains(&song.genre) {
                    *genre_like_counts.entry(song.genre.clone()).or_insert(0) += 1;
                }
            }
        }

        Ok(RecommendationSnapshot {
            liked_genres,
            genre_songs,
            genre_like_counts,
            liked,
        })
    }

    async fn insert_like(&self, user: UserId, song: SongId) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        let likes = inner.likes.entry(user).or_default();
        if likes.contains_key(&song) {
            return Ok(false);
        }

        likes.insert(
            song,
            Like {
                user_id: user,
                song_id: song,
                created_at: Utc::now(),
            },
        );
        Ok(true)
    }

    async fn delete_like(&self, user: UserId, song: SongId) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        let removed = inner
            .likes
            .get_mut(&user)
            .is_some_and(|likes| likes.remove(&song).is_some());
        Ok(removed)
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
