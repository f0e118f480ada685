pub mod like_index;
pub mod likes;
pub mod recommendations;
pub mod song_search;
