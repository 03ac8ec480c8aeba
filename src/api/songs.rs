use super::AppState;
use super::error::{ApiError, Message};
use crate::catalog::lyrics::{paginate, paginate_count};
use crate::catalog::{LyricsWindow, Song, SongFilter, SongRepository, SongRequest, StoreError};
use axum::Json;
use axum::body::Bytes;
use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use utoipa::IntoParams;

/// Raw query pairs in request order. Repeated keys are kept.
type QueryPairs = Result<Query<Vec<(String, String)>>, QueryRejection>;

/// Paging and filter parameters of `GET /songs`.
#[derive(Debug, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Substring of the group name, case-sensitive.
    group: Option<String>,
    /// Substring of the song name, case-sensitive.
    song: Option<String>,
    /// Page size, 10 when missing or not a non-negative integer.
    #[param(value_type = Option<i64>)]
    limit: Option<String>,
    /// Rows to skip, 0 when missing or not a non-negative integer.
    #[param(value_type = Option<i64>)]
    offset: Option<String>,
}

impl ListQuery {
    fn from_pairs(pairs: &[(String, String)]) -> Self {
        Self {
            group: first(pairs, "group"),
            song: first(pairs, "song"),
            limit: first(pairs, "limit"),
            offset: first(pairs, "offset"),
        }
    }
}

/// Verse window parameters of `GET /songText/{id}`.
#[derive(Debug, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TextQuery {
    /// End verse index (exclusive).
    #[param(value_type = Option<i64>)]
    limit: Option<String>,
    /// First verse index.
    #[param(value_type = Option<i64>)]
    offset: Option<String>,
    /// Number of verses from `offset`. Takes precedence over `limit` when positive.
    #[param(value_type = Option<i64>)]
    count: Option<String>,
}

impl TextQuery {
    fn from_pairs(pairs: &[(String, String)]) -> Self {
        Self {
            limit: first(pairs, "limit"),
            offset: first(pairs, "offset"),
            count: first(pairs, "count"),
        }
    }
}

#[utoipa::path(
    get,
    path = "/songs",
    tag = "songs",
    params(ListQuery),
    responses(
        (status = 200, description = "Matching songs ordered by id", body = Vec<Song>),
        (status = 500, description = "Storage failure", body = Message)
    )
)]
pub async fn list_songs(
    State(state): State<AppState>,
    query: QueryPairs,
) -> Result<Json<Vec<Song>>, ApiError> {
    let q = ListQuery::from_pairs(&query_pairs(query));
    let filter = SongFilter::from_query(
        q.group.as_deref(),
        q.song.as_deref(),
        q.limit.as_deref(),
        q.offset.as_deref(),
    );
    debug!(?filter, "list songs");

    let songs = blocking(&state, move |repo| repo.list(&filter))
        .await
        .map_err(|e| {
            error!(error = %e, "list songs failed");
            ApiError::DatabaseUnavailable
        })?;
    Ok(Json(songs))
}

#[utoipa::path(
    get,
    path = "/songText/{id}",
    tag = "songs",
    params(("id" = i64, Path, description = "Song id"), TextQuery),
    responses(
        (status = 200, description = "Selected verses joined by a space", body = LyricsWindow),
        (status = 400, description = "Id is not an integer", body = Message),
        (status = 404, description = "No song with this id", body = Message),
        (status = 500, description = "Storage failure", body = Message)
    )
)]
pub async fn song_text(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    query: QueryPairs,
) -> Result<Json<LyricsWindow>, ApiError> {
    let id = parse_id(path)?;

    let text = blocking(&state, move |repo| repo.lyrics_text(id))
        .await
        .map_err(|e| store_failure("get lyrics", id, e))?;

    let q = TextQuery::from_pairs(&query_pairs(query));
    let limit = parse_int(q.limit.as_deref());
    let offset = parse_int(q.offset.as_deref());
    let window = match parse_int(q.count.as_deref()).filter(|c| *c > 0) {
        Some(count) => paginate_count(&text, offset, Some(count)),
        None => paginate(&text, limit, offset),
    };
    Ok(Json(window))
}

#[utoipa::path(
    delete,
    path = "/song/{id}",
    tag = "songs",
    params(("id" = i64, Path, description = "Song id")),
    responses(
        (status = 204, description = "Song deleted"),
        (status = 400, description = "Id is not an integer", body = Message),
        (status = 404, description = "No song with this id", body = Message),
        (status = 500, description = "Storage failure", body = Message)
    )
)]
pub async fn delete_song(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(path)?;

    blocking(&state, move |repo| repo.delete(id))
        .await
        .map_err(|e| store_failure("delete song", id, e))?;

    info!(id, "song deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Replace every field of a song. The `id` in the body is ignored.
#[utoipa::path(
    put,
    path = "/song/{id}",
    tag = "songs",
    params(("id" = i64, Path, description = "Song id")),
    request_body = Song,
    responses(
        (status = 204, description = "Song updated"),
        (status = 400, description = "Bad id or incomplete song", body = Message),
        (status = 404, description = "No song with this id", body = Message),
        (status = 500, description = "Storage failure", body = Message)
    )
)]
pub async fn update_song(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(path)?;
    let song: Song = serde_json::from_slice(&body).map_err(|e| {
        info!(id, error = %e, "invalid song body");
        ApiError::InvalidSong
    })?;

    blocking(&state, move |repo| repo.update(id, &song))
        .await
        .map_err(|e| store_failure("update song", id, e))?;

    info!(id, "song updated");
    Ok(StatusCode::NO_CONTENT)
}

/// Create a song from `{group, song}`. The rest comes from the song info service.
#[utoipa::path(
    post,
    path = "/song",
    tag = "songs",
    request_body = SongRequest,
    responses(
        (status = 204, description = "Song added"),
        (status = 400, description = "Malformed request", body = Message),
        (status = 500, description = "Lookup or storage failure", body = Message)
    )
)]
pub async fn add_song(State(state): State<AppState>, body: Bytes) -> Result<StatusCode, ApiError> {
    let request: SongRequest = serde_json::from_slice(&body).map_err(|e| {
        info!(error = %e, "invalid song request");
        ApiError::InvalidRequest
    })?;

    debug!(group = %request.group_name, song = %request.song_name, "fetching song info");
    let detail = state.info.fetch(&request).await.map_err(|e| {
        warn!(
            group = %request.group_name,
            song = %request.song_name,
            error = ?e,
            "song info lookup failed"
        );
        ApiError::Upstream
    })?;

    let song = Song::from_lookup(request, detail);
    let id = blocking(&state, move |repo| repo.insert(&song))
        .await
        .map_err(|e| {
            error!(error = %e, "add song failed");
            ApiError::DatabaseUnavailable
        })?;

    info!(id, "song added");
    Ok(StatusCode::NO_CONTENT)
}

/// Run a repository call on the blocking pool.
async fn blocking<T, F>(state: &AppState, f: F) -> Result<T, StoreError>
where
    F: FnOnce(&dyn SongRepository) -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    let repo = Arc::clone(&state.repo);
    tokio::task::spawn_blocking(move || f(repo.as_ref()))
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
}

fn parse_id(path: Result<Path<String>, PathRejection>) -> Result<i64, ApiError> {
    let raw = match path {
        Ok(Path(raw)) => raw,
        Err(e) => {
            info!(error = %e, "invalid id path");
            return Err(ApiError::InvalidId);
        }
    };
    raw.parse::<i64>().map_err(|e| {
        info!(id = %raw, error = %e, "invalid id");
        ApiError::InvalidId
    })
}

fn query_pairs(query: QueryPairs) -> Vec<(String, String)> {
    match query {
        Ok(Query(pairs)) => pairs,
        Err(e) => {
            info!(error = %e, "invalid query string, using defaults");
            Vec::new()
        }
    }
}

/// First value for `key`; later repeats are ignored.
fn first(pairs: &[(String, String)], key: &str) -> Option<String> {
    pairs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.clone())
}

fn parse_int(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|s| s.parse().ok())
}

fn store_failure(op: &str, id: i64, err: StoreError) -> ApiError {
    match err {
        StoreError::NotFound => {
            info!(id, "{op}: song not found");
            ApiError::SongNotFound
        }
        other => {
            error!(id, error = %other, "{op} failed");
            ApiError::Internal
        }
    }
}
