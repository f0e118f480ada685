pub mod like;
pub mod song;

pub use like::{Like, LikeOutcome, MessageResponse, UnlikeOutcome};
pub use song::{AnnotatedSong, NewSong, Song, SongId, UserId};
