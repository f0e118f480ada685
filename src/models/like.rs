use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{SongId, UserId};

/// A user's like of a song. At most one exists per (user, song) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Like {
    pub user_id: UserId,
    pub song_id: SongId,
    pub created_at: DateTime<Utc>,
}

/// Result of liking a song
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeOutcome {
    Created,
    AlreadyLiked,
}

impl LikeOutcome {
    pub fn status(&self) -> StatusCode {
        match self {
            LikeOutcome::Created => StatusCode::CREATED,
            LikeOutcome::AlreadyLiked => StatusCode::OK,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            LikeOutcome::Created => "Song liked successfully.",
            LikeOutcome::AlreadyLiked => "You already liked this song.",
        }
    }
}

/// Result of unliking a song. Both variants are successes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlikeOutcome {
    Removed,
    NotLiked,
}

impl UnlikeOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            UnlikeOutcome::Removed => "Song unliked successfully.",
            UnlikeOutcome::NotLiked => "You haven't liked this song.",
        }
    }
}

/// Body returned by the like and unlike endpoints
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}
