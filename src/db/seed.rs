use anyhow::Context;

use super::CatalogStore;
use crate::models::NewSong;

/// Parses a JSON array of songs
pub fn parse_seed(json: &str) -> anyhow::Result<Vec<NewSong>> {
    serde_json::from_str(json).context("Seed file is not a JSON array of songs")
}

/// Reads and parses the catalog seed file at `path`
pub async fn load_seed_file(path: &str) -> anyhow::Result<Vec<NewSong>> {
    let json = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read seed file {}", path))?;
    parse_seed(&json)
}

/// Inserts songs in file order, so ids follow the order of the seed file
pub async fn seed_store(store: &dyn CatalogStore, songs: Vec<NewSong>) -> anyhow::Result<usize> {
    let count = songs.len();
    for song in songs {
        store.insert_song(song).await?;
    }

    tracing::info!(store = store.name(), count, "Seeded catalog");
    Ok(count)
}
