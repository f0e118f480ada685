use std::collections::HashSet;

use crate::{
    db::{CatalogStore, SongScope},
    error::{AppError, AppResult},
    models::{AnnotatedSong, UserId},
    services::like_index,
};

/// Longest accepted search query, in characters
pub const MAX_QUERY_CHARS: usize = 256;

/// Splits a query into distinct whitespace-separated terms
///
/// Terms that differ only by case are kept once since matching ignores case.
pub fn tokenize(query: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    query
        .split_whitespace()
        .filter(|word| seen.insert(word.to_lowercase()))
        .map(str::to_string)
        .collect()
}

/// Searches song titles and artist names
///
/// A song matches when any term occurs in its title or artist name, ignoring
/// case. An empty or blank query applies no filter and returns the whole
/// catalog.
pub async fn search_songs(
    store: &dyn CatalogStore,
    user: UserId,
    query: &str,
) -> AppResult<Vec<AnnotatedSong>> {
    if query.chars().count() > MAX_QUERY_CHARS {
        return Err(AppError::InvalidInput(format!(
            "Search query must be at most {} characters",
            MAX_QUERY_CHARS
        )));
    }

    let terms = tokenize(query);
    let scope = if terms.is_empty() {
        SongScope::All
    } else {
        SongScope::Matching(terms)
    };

    like_index::annotated_songs(store, user, &scope).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryStore, MockCatalogStore};
    use crate::models::NewSong;

    async fn catalog() -> MemoryStore {
        let store = MemoryStore::new();
        for (title, artist) in [
            ("Rock Anthem", "Nobody Famous"),
            ("Dirty Harry", "Roll Deep"),
            ("Take Five", "Dave Brubeck"),
            ("Rock and Roll", "Led Zeppelin"),
        ] {
            store.insert_song(NewSong::new(title, artist, "misc")).await.unwrap();
        }
        store
    }

    fn titles(songs: &[AnnotatedSong]) -> Vec<&str> {
        songs.iter().map(|s| s.song.title.as_str()).collect()
    }

    #[test]
    fn test_tokenize_splits_on_any_whitespace() {
        assert_eq!(tokenize("  rock\troll\n jazz "), vec!["rock", "roll", "jazz"]);
    }

    #[test]
    fn test_tokenize_drops_case_duplicates() {
        assert_eq!(tokenize("Rock rock ROCK roll"), vec!["Rock", "roll"]);
    }

    #[test]
    fn test_tokenize_blank() {
        assert!(tokenize("   ").is_empty());
        assert!(tokenize("").is_empty());
    }

    #[tokio::test]
    async fn test_any_term_in_either_field() {
        let store = catalog().await;
        let found = search_songs(&store, UserId(1), "rock roll").await.unwrap();
        assert_eq!(titles(&found), vec!["Rock Anthem", "Dirty Harry", "Rock and Roll"]);
    }

    #[tokio::test]
    async fn test_song_matching_several_terms_appears_once() {
        let store = catalog().await;
        let found = search_songs(&store, UserId(1), "rock and roll").await.unwrap();
        assert_eq!(
            found.iter().filter(|s| s.song.title == "Rock and Roll").count(),
            1
        );
    }

    #[tokio::test]
    async fn test_case_insensitive_substring() {
        let store = catalog().await;
        let found = search_songs(&store, UserId(1), "BRUB").await.unwrap();
        assert_eq!(titles(&found), vec!["Take Five"]);
    }

    #[tokio::test]
    async fn test_blank_query_returns_catalog() {
        let store = catalog().await;
        let found = search_songs(&store, UserId(1), "  ").await.unwrap();
        assert_eq!(found.len(), 4);
    }

    #[tokio::test]
    async fn test_results_carry_like_state() {
        let store = catalog().await;
        store.insert_like(UserId(1), crate::models::SongId(2)).await.unwrap();

        let found = search_songs(&store, UserId(1), "roll").await.unwrap();
        let flags: Vec<(&str, bool)> = found
            .iter()
            .map(|s| (s.song.title.as_str(), s.liked))
            .collect();
        assert_eq!(flags, vec![("Dirty Harry", true), ("Rock and Roll", false)]);
    }

    #[tokio::test]
    async fn test_overlong_query_rejected_before_store() {
        // No expectations: any store call would panic
        let store = MockCatalogStore::new();
        let query = "a".repeat(MAX_QUERY_CHARS + 1);

        let result = search_songs(&store, UserId(1), &query).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }
}
