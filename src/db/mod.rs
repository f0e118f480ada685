use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::{
    config::{Config, StoreBackend},
    error::AppResult,
    models::{NewSong, Song, SongId, UserId},
};

pub mod memory;
pub mod postgres;
pub mod seed;

pub use memory::MemoryStore;
pub use postgres::{create_pool, PostgresStore};

/// Which songs a listing reads from the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SongScope {
    /// The whole catalog
    All,
    /// Songs the requesting user likes, most recently liked first
    Liked,
    /// Songs whose title or artist name contains any of the terms, ignoring case
    Matching(Vec<String>),
}

/// Songs read for a listing together with the ids the requesting user likes.
/// Both halves come from the same consistent read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LikeSnapshot {
    pub songs: Vec<Song>,
    pub liked: HashSet<SongId>,
}

/// Everything the recommender needs for one user, read consistently
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecommendationSnapshot {
    /// Distinct genres among the songs the user likes
    pub liked_genres: HashSet<String>,
    /// Every catalog song whose genre is in `liked_genres`, liked or not
    pub genre_songs: Vec<Song>,
    /// Likes across all users per genre in `liked_genres`. Genres without likes may be absent.
    pub genre_like_counts: HashMap<String, i64>,
    /// Ids of the songs the user likes
    pub liked: HashSet<SongId>,
}

/// Persistence for songs and likes
///
/// Implementations must make `insert_like` and `delete_like` atomic on the
/// (user, song) pair: concurrent callers racing on the same pair see exactly one
/// `true`. Snapshot reads must reflect the likes table at a single instant.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogStore: Send + Sync {
    /// Point lookup of a song
    async fn get_song(&self, id: SongId) -> AppResult<Option<Song>>;

    /// Adds a song to the catalog, assigning the next id
    async fn insert_song(&self, song: NewSong) -> AppResult<Song>;

    /// Reads the songs in `scope` and the user's liked ids
    async fn songs_with_likes(&self, user: UserId, scope: &SongScope) -> AppResult<LikeSnapshot>;

    /// Reads the user's genre affinity and global per-genre like counts
    async fn recommendation_snapshot(&self, user: UserId) -> AppResult<RecommendationSnapshot>;

    /// Creates the like if absent. Returns `false` when it already existed.
    async fn insert_like(&self, user: UserId, song: SongId) -> AppResult<bool>;

    /// Removes the like if present. Returns `false` when there was none.
    async fn delete_like(&self, user: UserId, song: SongId) -> AppResult<bool>;

    /// Store name for logging
    fn name(&self) -> &'static str;
}

/// Opens the configured catalog store
///
/// Postgres is migrated before use. The memory store starts empty unless
/// `seed_file` names a JSON catalog to load.
pub async fn open_store(config: &Config) -> anyhow::Result<Arc<dyn CatalogStore>> {
    match config.store {
        StoreBackend::Postgres => {
            if config.seed_file.is_some() {
                tracing::warn!("SEED_FILE is only read by the memory store, ignoring it");
            }
            let pool = create_pool(&config.database_url, config.max_connections).await?;
            let store = PostgresStore::new(pool);
            store.migrate().await?;
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store, likes are lost on restart");
            let store = MemoryStore::new();
            match &config.seed_file {
                Some(path) => {
                    let songs = seed::load_seed_file(path).await?;
                    seed::seed_store(&store, songs).await?;
                }
                None => tracing::warn!("No SEED_FILE set, the catalog is empty"),
            }
            Ok(Arc::new(store))
        }
    }
}
