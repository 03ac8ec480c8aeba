//! Song catalog domain
//!
//! This module provides:
//! - Song data structures shared by storage, lookup and HTTP layers
//! - The repository contract and its error type
//! - Lyrics windowing

pub mod lyrics;
pub mod models;
pub mod repository;

pub use models::{LyricsWindow, Song, SongDetail, SongRequest};
pub use repository::{SongFilter, SongRepository, StoreError};
