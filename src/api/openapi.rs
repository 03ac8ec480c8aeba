use super::error::Message;
use super::songs;
use crate::catalog::{LyricsWindow, Song, SongRequest};
use utoipa::OpenApi;

/// Served at `/api-docs/openapi.json`, browsable under `/swagger/`.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "songbook",
        description = "Song catalog with lyrics. Every error body is a `Message`; \
                       a request that runs past the server timeout gets a 503."
    ),
    paths(
        songs::list_songs,
        songs::song_text,
        songs::delete_song,
        songs::update_song,
        songs::add_song,
    ),
    components(schemas(Song, SongRequest, LyricsWindow, Message)),
    tags((name = "songs", description = "Catalog entries and their lyrics"))
)]
pub struct ApiDoc;
