use super::models::Song;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("song not found")]
    NotFound,
    #[error("database error: {0}")]
    Database(rusqlite::Error),
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),
    #[error("storage task failed: {0}")]
    Task(String),
}

// Every "no row" signal from the driver ends up here.
impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
            other => StoreError::Database(other),
        }
    }
}

/// Listing criteria. Empty filters match everything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongFilter {
    pub group: String,
    pub song: String,
    pub limit: i64,
    pub offset: i64,
}

impl Default for SongFilter {
    fn default() -> Self {
        Self {
            group: String::new(),
            song: String::new(),
            limit: SongFilter::DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl SongFilter {
    pub const DEFAULT_LIMIT: i64 = 10;

    /// Build a filter from raw query values. Bad paging values fall back to defaults.
    pub fn from_query(
        group: Option<&str>,
        song: Option<&str>,
        limit: Option<&str>,
        offset: Option<&str>,
    ) -> Self {
        let limit = limit
            .and_then(|s| s.parse::<i64>().ok())
            .filter(|l| *l > 0)
            .unwrap_or(Self::DEFAULT_LIMIT);
        let offset = offset
            .and_then(|s| s.parse::<i64>().ok())
            .filter(|o| *o >= 0)
            .unwrap_or(0);

        Self {
            group: group.unwrap_or_default().to_string(),
            song: song.unwrap_or_default().to_string(),
            limit,
            offset,
        }
    }
}

/// Persistent song storage.
///
/// Implementations are blocking; async callers should hop onto a blocking thread.
#[cfg_attr(test, mockall::automock)]
pub trait SongRepository: Send + Sync {
    /// Songs matching `filter`, at most `filter.limit` of them starting at `filter.offset`.
    fn list(&self, filter: &SongFilter) -> Result<Vec<Song>, StoreError>;

    /// Full lyrics of the song with `id`.
    fn lyrics_text(&self, id: i64) -> Result<String, StoreError>;

    /// Store a new song and return the id storage assigned to it. `song.id` is ignored.
    fn insert(&self, song: &Song) -> Result<i64, StoreError>;

    /// Overwrite every field of the song with `id`. `song.id` is ignored.
    fn update(&self, id: i64, song: &Song) -> Result<(), StoreError>;

    fn delete(&self, id: i64) -> Result<(), StoreError>;
}
