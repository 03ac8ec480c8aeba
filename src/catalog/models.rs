use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A catalog entry. `id` is assigned by storage on insert and never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Song {
    #[serde(default)]
    pub id: i64,
    #[serde(rename = "group")]
    pub group_name: String,
    #[serde(rename = "song")]
    pub song_name: String,
    #[serde(rename = "releaseDate")]
    pub release_date: String,
    pub text: String,
    pub link: String,
}

impl Song {
    /// Merge a creation request with the lookup result.
    pub fn from_lookup(request: SongRequest, detail: SongDetail) -> Self {
        Self {
            id: 0,
            group_name: request.group_name,
            song_name: request.song_name,
            release_date: detail.release_date,
            text: detail.text,
            link: detail.link,
        }
    }
}

/// Body of `POST /song`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SongRequest {
    #[serde(rename = "group")]
    pub group_name: String,
    #[serde(rename = "song")]
    pub song_name: String,
}

/// What the song-info service knows about a song.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongDetail {
    #[serde(rename = "releaseDate")]
    pub release_date: String,
    pub text: String,
    pub link: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LyricsWindow {
    pub text: String,
}
