use std::collections::HashSet;

use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, Transaction};

use super::{CatalogStore, LikeSnapshot, RecommendationSnapshot, SongScope};
use crate::{
    error::AppResult,
    models::{NewSong, Song, SongId, UserId},
};

const SONG_COLUMNS: &str = "s.id, s.title, s.artist_name, s.audio_file, s.image, s.genre";

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Escapes LIKE wildcards so a search term only matches literally
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Catalog store backed by PostgreSQL
///
/// The (user_id, song_id) primary key on `likes` is what keeps likes unique;
/// multi-query reads run in a repeatable-read transaction.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies pending schema migrations
    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    async fn begin_snapshot(&self) -> AppResult<Transaction<'static, Postgres>> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;
        Ok(tx)
    }

    async fn liked_ids(
        tx: &mut Transaction<'static, Postgres>,
        user: UserId,
    ) -> AppResult<HashSet<SongId>> {
        let ids = sqlx::query_scalar::<_, SongId>("SELECT song_id FROM likes WHERE user_id = $1")
            .bind(user)
            .fetch_all(&mut **tx)
            .await?;
        Ok(ids.into_iter().collect())
    }
}

#[async_trait::async_trait]
impl CatalogStore for PostgresStore {
    async fn get_song(&self, id: SongId) -> AppResult<Option<Song>> {
        let song = sqlx::query_as::<_, Song>(&format!(
            "SELECT {SONG_COLUMNS} FROM songs s WHERE s.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(song)
    }

    async fn insert_song(&self, song: NewSong) -> AppResult<Song> {
        let song = sqlx::query_as::<_, Song>(
            r#"
            INSERT INTO songs (title, artist_name, audio_file, image, genre)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, artist_name, audio_file, image, genre
            "#,
        )
        .bind(&song.title)
        .bind(&song.artist_name)
        .bind(&song.audio_file)
        .bind(&song.image)
        .bind(&song.genre)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(song_id = %song.id, genre = %song.genre, "Inserted song");
        Ok(song)
    }

    async fn songs_with_likes(&self, user: UserId, scope: &SongScope) -> AppResult<LikeSnapshot> {
        let mut tx = self.begin_snapshot().await?;
        let liked = Self::liked_ids(&mut tx, user).await?;

        let songs = match scope {
            SongScope::All => {
                sqlx::query_as::<_, Song>(&format!(
                    "SELECT {SONG_COLUMNS} FROM songs s ORDER BY s.id"
                ))
                .fetch_all(&mut *tx)
                .await?
            }
            SongScope::Liked => {
                sqlx::query_as::<_, Song>(&format!(
                    "SELECT {SONG_COLUMNS} FROM songs s \
                     JOIN likes l ON l.song_id = s.id \
                     WHERE l.user_id = $1 \
                     ORDER BY l.created_at DESC, s.id DESC"
                ))
                .bind(user)
                .fetch_all(&mut *tx)
                .await?
            }
            SongScope::Matching(terms) => {
                let patterns: Vec<String> = terms.iter().map(|t| like_pattern(t)).collect();
                sqlx::query_as::<_, Song>(&format!(
                    "SELECT {SONG_COLUMNS} FROM songs s \
                     WHERE s.title ILIKE ANY($1) OR s.artist_name ILIKE ANY($1) \
                     ORDER BY s.id"
                ))
                .bind(patterns)
                .fetch_all(&mut *tx)
                .await?
            }
        };

        tx.commit().await?;
        Ok(LikeSnapshot { songs, liked })
    }

    async fn recommendation_snapshot(&self, user: UserId) -> AppResult<RecommendationSnapshot> {
        let mut tx = self.begin_snapshot().await?;

        let liked_genres = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT s.genre FROM songs s JOIN likes l ON l.song_id = s.id WHERE l.user_id = $1",
        )
        .bind(user)
        .fetch_all(&mut *tx)
        .await?;

        if liked_genres.is_empty() {
            tx.commit().await?;
            return Ok(RecommendationSnapshot::default());
        }

        let liked = Self::liked_ids(&mut tx, user).await?;

        let genre_songs = sqlx::query_as::<_, Song>(&format!(
            "SELECT {SONG_COLUMNS} FROM songs s WHERE s.genre = ANY($1)"
        ))
        .bind(&liked_genres)
        .fetch_all(&mut *tx)
        .await?;

        let genre_like_counts = sqlx::query_as::<_, (String, i64)>(
            r#"
            SELECT s.genre, COUNT(*)
            FROM likes l
            JOIN songs s ON s.id = l.song_id
            WHERE s.genre = ANY($1)
            GROUP BY s.genre
            "#,
        )
        .bind(&liked_genres)
        .fetch_all(&mut *tx)
        .await?
        .into_iter()
        .collect();

        tx.commit().await?;

        Ok(RecommendationSnapshot {
            liked_genres: liked_genres.into_iter().collect(),
            genre_songs,
            genre_like_counts,
            liked,
        })
    }

    async fn insert_like(&self, user: UserId, song: SongId) -> AppResult<bool> {
        let result = sqlx::query(
            "INSERT INTO likes (user_id, song_id) VALUES ($1, $2) ON CONFLICT (user_id, song_id) DO NOTHING",
        )
        .bind(user)
        .bind(song)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete_like(&self, user: UserId, song: SongId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM likes WHERE user_id = $1 AND song_id = $2")
            .bind(user)
            .bind(song)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::recommendations::rank;

    async fn insert_all(store: &PostgresStore, songs: &[(&str, &str)]) -> Vec<Song> {
        let mut created = Vec::new();
        for (title, genre) in songs {
            created.push(
                store
                    .insert_song(NewSong::new(title, "Artist", genre))
                    .await
                    .unwrap(),
            );
        }
        created
    }

    async fn like_from(store: &PostgresStore, users: std::ops::RangeInclusive<i64>, song: SongId) {
        for user in users {
            assert!(store.insert_like(UserId(user), song).await.unwrap());
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_recommendations_rank_by_genre_popularity(pool: PgPool) {
        let store = PostgresStore::new(pool);
        let songs = insert_all(
            &store,
            &[
                ("A", "jazz"),
                ("B", "rock"),
                ("D", "jazz"),
                ("C", "jazz"),
                ("E", "pop"),
                ("F", "rock"),
            ],
        )
        .await;
        let (a, b, d, c, e, f) = (
            &songs[0], &songs[1], &songs[2], &songs[3], &songs[4], &songs[5],
        );
        let user = UserId(1);

        store.insert_like(user, a.id).await.unwrap();
        store.insert_like(user, b.id).await.unwrap();
        like_from(&store, 2..=6, c.id).await;
        like_from(&store, 2..=3, d.id).await;
        like_from(&store, 2..=11, e.id).await;

        let snapshot = store.recommendation_snapshot(user).await.unwrap();
        assert_eq!(
            snapshot.liked_genres,
            HashSet::from(["jazz".to_string(), "rock".to_string()])
        );
        // Counts include every user's likes, not only the requester's
        assert_eq!(snapshot.genre_like_counts.get("jazz"), Some(&8));
        assert_eq!(snapshot.genre_like_counts.get("rock"), Some(&1));
        assert_eq!(snapshot.genre_like_counts.get("pop"), None);
        assert_eq!(snapshot.liked, HashSet::from([a.id, b.id]));

        let ranked: Vec<SongId> = rank(snapshot).into_iter().map(|s| s.song.id).collect();
        assert_eq!(ranked, vec![c.id, d.id, f.id]);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_recommendation_snapshot_empty_without_likes(pool: PgPool) {
        let store = PostgresStore::new(pool);
        let songs = insert_all(&store, &[("A", "jazz")]).await;
        store.insert_like(UserId(2), songs[0].id).await.unwrap();

        let snapshot = store.recommendation_snapshot(UserId(1)).await.unwrap();
        assert_eq!(snapshot, RecommendationSnapshot::default());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_like_and_unlike_report_changes(pool: PgPool) {
        let store = PostgresStore::new(pool);
        let songs = insert_all(&store, &[("Take Five", "jazz")]).await;
        let (user, song) = (UserId(7), songs[0].id);

        assert!(store.insert_like(user, song).await.unwrap());
        assert!(!store.insert_like(user, song).await.unwrap());

        let snapshot = store.songs_with_likes(user, &SongScope::Liked).await.unwrap();
        assert_eq!(snapshot.songs.len(), 1);
        assert_eq!(snapshot.liked, HashSet::from([song]));

        assert!(store.delete_like(user, song).await.unwrap());
        assert!(!store.delete_like(user, song).await.unwrap());

        let snapshot = store.songs_with_likes(user, &SongScope::Liked).await.unwrap();
        assert!(snapshot.songs.is_empty());
        assert!(snapshot.liked.is_empty());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_search_wildcards_match_literally(pool: PgPool) {
        let store = PostgresStore::new(pool);
        let songs = insert_all(
            &store,
            &[
                ("100% Pure", "pop"),
                ("1000 Pure", "pop"),
                ("a_b", "rock"),
                ("axb", "rock"),
            ],
        )
        .await;

        let scope = SongScope::Matching(vec!["100%".to_string()]);
        let snapshot = store.songs_with_likes(UserId(1), &scope).await.unwrap();
        let ids: Vec<SongId> = snapshot.songs.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![songs[0].id]);

        let scope = SongScope::Matching(vec!["A_B".to_string()]);
        let snapshot = store.songs_with_likes(UserId(1), &scope).await.unwrap();
        let ids: Vec<SongId> = snapshot.songs.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![songs[2].id]);
    }

    #[test]
    fn test_like_pattern_wraps_term() {
        assert_eq!(like_pattern("rock"), "%rock%");
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern("c:\\d"), "%c:\\\\d%");
    }
}
