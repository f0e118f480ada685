use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

/// Identifier of a song in the catalog
///
/// Ids are assigned in insertion order, so a higher id means a more recently
/// added song.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct SongId(pub i64);

impl Display for SongId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SongId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().parse::<i64>() {
            Ok(id) if id > 0 => Ok(SongId(id)),
            _ => Err(format!("Invalid song id: {:?}", s)),
        }
    }
}

/// Identifier of an authenticated user, resolved outside this service
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct UserId(pub i64);

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A song in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Song {
    pub id: SongId,
    pub title: String,
    pub artist_name: String,
    /// Storage reference of the audio asset
    pub audio_file: String,
    /// Storage reference of the cover image, if any
    pub image: Option<String>,
    pub genre: String,
}

/// Fields needed to add a song to the catalog
#[derive(Debug, Clone, Deserialize)]
pub struct NewSong {
    pub title: String,
    pub artist_name: String,
    pub audio_file: String,
    #[serde(default)]
    pub image: Option<String>,
    pub genre: String,
}

impl NewSong {
    pub fn new(title: &str, artist_name: &str, genre: &str) -> Self {
        Self {
            title: title.to_string(),
            artist_name: artist_name.to_string(),
            audio_file: format!("songs/{}.mp3", title.to_lowercase().replace(' ', "_")),
            image: None,
            genre: genre.to_string(),
        }
    }

    pub(crate) fn into_song(self, id: SongId) -> Song {
        Song {
            id,
            title: self.title,
            artist_name: self.artist_name,
            audio_file: self.audio_file,
            image: self.image,
            genre: self.genre,
        }
    }
}

/// A song as seen by one user: the catalog record plus whether that user likes it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotatedSong {
    #[serde(flatten)]
    pub song: Song,
    pub liked: bool,
}
