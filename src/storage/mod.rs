use crate::catalog::{Song, SongFilter, SongRepository, StoreError};
use anyhow::Context;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Row, params};
use std::path::Path;

pub type ConnectionPool = Pool<SqliteConnectionManager>;

/// SQLite-backed song storage.
///
/// Every operation checks a connection out of the pool and returns it when done,
/// so one instance can be shared across request tasks.
#[derive(Clone)]
pub struct SqliteSongRepository {
    pool: ConnectionPool,
}

impl SqliteSongRepository {
    pub fn open(path: &Path, pool_size: u32) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create dir {}", parent.display()))?;
        }

        let manager = SqliteConnectionManager::file(path).with_init(|conn| {
            conn.execute_batch(
                "PRAGMA foreign_keys = ON;
                 PRAGMA journal_mode = WAL;
                 PRAGMA busy_timeout = 5000;",
            )
        });
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .with_context(|| format!("open {}", path.display()))?;

        let repo = Self { pool };
        repo.init_schema()?;
        Ok(repo)
    }

    fn init_schema(&self) -> anyhow::Result<()> {
        let conn = self.pool.get().context("get connection")?;
        conn.execute_batch(
            r#"
CREATE TABLE IF NOT EXISTS songs (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  group_name TEXT NOT NULL,
  song_name TEXT NOT NULL,
  release_date TEXT NOT NULL DEFAULT '',
  text TEXT NOT NULL DEFAULT '',
  link TEXT NOT NULL DEFAULT ''
);

CREATE INDEX IF NOT EXISTS idx_songs_group_name ON songs(group_name);
"#,
        )
        .context("init schema")?;
        Ok(())
    }

    fn row_to_song(row: &Row) -> rusqlite::Result<Song> {
        Ok(Song {
            id: row.get(0)?,
            group_name: row.get(1)?,
            song_name: row.get(2)?,
            release_date: row.get(3)?,
            text: row.get(4)?,
            link: row.get(5)?,
        })
    }
}

impl SongRepository for SqliteSongRepository {
    fn list(&self, filter: &SongFilter) -> Result<Vec<Song>, StoreError> {
        let conn = self.pool.get()?;
        // instr() keeps the match case-sensitive; LIKE would not be.
        let mut stmt = conn.prepare(
            r#"
SELECT id, group_name, song_name, release_date, text, link
FROM songs
WHERE instr(group_name, ?1) > 0 AND instr(song_name, ?2) > 0
ORDER BY id
LIMIT ?3 OFFSET ?4
"#,
        )?;

        let rows = stmt.query_map(
            params![filter.group, filter.song, filter.limit, filter.offset],
            Self::row_to_song,
        )?;

        let mut songs = Vec::new();
        for song in rows {
            songs.push(song?);
        }
        Ok(songs)
    }

    fn lyrics_text(&self, id: i64) -> Result<String, StoreError> {
        let conn = self.pool.get()?;
        let text = conn.query_row("SELECT text FROM songs WHERE id = ?1", params![id], |row| {
            row.get(0)
        })?;
        Ok(text)
    }

    fn insert(&self, song: &Song) -> Result<i64, StoreError> {
        let conn = self.pool.get()?;
        conn.execute(
            r#"
INSERT INTO songs(group_name, song_name, release_date, text, link)
VALUES(?1, ?2, ?3, ?4, ?5)
"#,
            params![
                song.group_name,
                song.song_name,
                song.release_date,
                song.text,
                song.link
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn update(&self, id: i64, song: &Song) -> Result<(), StoreError> {
        let conn = self.pool.get()?;
        // `?` runs before the row count check, so a failed statement never reads as NotFound.
        let affected = conn.execute(
            r#"
UPDATE songs
SET group_name = ?1, song_name = ?2, release_date = ?3, text = ?4, link = ?5
WHERE id = ?6
"#,
            params![
                song.group_name,
                song.song_name,
                song.release_date,
                song.text,
                song.link,
                id
            ],
        )?;
        if affected == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    fn delete(&self, id: i64) -> Result<(), StoreError> {
        let conn = self.pool.get()?;
        let affected = conn.execute("DELETE FROM songs WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, SqliteSongRepository) {
        let temp_dir = tempfile::tempdir().unwrap();
        let repo = SqliteSongRepository::open(&temp_dir.path().join("songs.db"), 2).unwrap();
        (temp_dir, repo)
    }

    fn make_song(group: &str, name: &str) -> Song {
        Song {
            id: 0,
            group_name: group.to_string(),
            song_name: name.to_string(),
            release_date: "16.07.2006".to_string(),
            text: "Ooh baby, don't you know I suffer?\nOoh baby, can you hear me moan?".to_string(),
            link: "https://www.youtube.com/watch?v=Xsp3_a-PMTw".to_string(),
        }
    }

    fn filter(group: &str, song: &str) -> SongFilter {
        SongFilter {
            group: group.to_string(),
            song: song.to_string(),
            ..SongFilter::default()
        }
    }

    #[test]
    fn test_open_creates_file_and_reopens() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("nested").join("songs.db");

        let repo = SqliteSongRepository::open(&db_path, 1).unwrap();
        repo.insert(&make_song("Muse", "Uprising")).unwrap();
        drop(repo);
        assert!(db_path.exists());

        let repo = SqliteSongRepository::open(&db_path, 1).unwrap();
        assert_eq!(repo.list(&SongFilter::default()).unwrap().len(), 1);
    }

    #[test]
    fn test_insert_assigns_ids() {
        let (_temp_dir, repo) = create_test_repo();

        let mut song = make_song("Muse", "Supermassive Black Hole");
        song.id = 42;
        let first = repo.insert(&song).unwrap();
        let second = repo.insert(&make_song("Muse", "Uprising")).unwrap();

        assert_ne!(first, 42);
        assert!(second > first);

        let songs = repo.list(&SongFilter::default()).unwrap();
        assert_eq!(songs.len(), 2);
        assert_eq!(songs[0].id, first);
        assert_eq!(songs[0].song_name, "Supermassive Black Hole");
        assert_eq!(songs[0].release_date, "16.07.2006");
    }

    #[test]
    fn test_list_filters_by_substring() {
        let (_temp_dir, repo) = create_test_repo();
        repo.insert(&make_song("Muse", "Supermassive Black Hole")).unwrap();
        repo.insert(&make_song("Muse", "Uprising")).unwrap();
        repo.insert(&make_song("Metallica", "Enter Sandman")).unwrap();

        let songs = repo.list(&filter("Mu", "")).unwrap();
        assert_eq!(songs.len(), 2);
        assert!(songs.iter().all(|s| s.group_name.contains("Mu")));

        let songs = repo.list(&filter("", "ris")).unwrap();
        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].song_name, "Uprising");

        let songs = repo.list(&filter("Muse", "Sandman")).unwrap();
        assert!(songs.is_empty());
    }

    #[test]
    fn test_list_is_case_sensitive() {
        let (_temp_dir, repo) = create_test_repo();
        repo.insert(&make_song("Muse", "Uprising")).unwrap();

        assert!(repo.list(&filter("muse", "")).unwrap().is_empty());
        assert_eq!(repo.list(&filter("Muse", "")).unwrap().len(), 1);
    }

    #[test]
    fn test_list_limit_and_offset() {
        let (_temp_dir, repo) = create_test_repo();
        for i in 0..5 {
            repo.insert(&make_song("Band", &format!("Song {i}"))).unwrap();
        }

        let page = repo
            .list(&SongFilter {
                limit: 2,
                offset: 1,
                ..SongFilter::default()
            })
            .unwrap();
        let names: Vec<_> = page.iter().map(|s| s.song_name.as_str()).collect();
        assert_eq!(names, vec!["Song 1", "Song 2"]);

        let page = repo
            .list(&SongFilter {
                offset: 10,
                ..SongFilter::default()
            })
            .unwrap();
        assert!(page.is_empty());
    }

    #[test]
    fn test_lyrics_text() {
        let (_temp_dir, repo) = create_test_repo();
        let id = repo.insert(&make_song("Muse", "Supermassive Black Hole")).unwrap();

        let text = repo.lyrics_text(id).unwrap();
        assert!(text.starts_with("Ooh baby"));

        assert!(matches!(repo.lyrics_text(id + 100), Err(StoreError::NotFound)));
    }

    #[test]
    fn test_delete_then_lyrics_is_not_found() {
        let (_temp_dir, repo) = create_test_repo();
        let id = repo.insert(&make_song("Muse", "Uprising")).unwrap();

        repo.delete(id).unwrap();
        assert!(matches!(repo.lyrics_text(id), Err(StoreError::NotFound)));
        assert!(matches!(repo.delete(id), Err(StoreError::NotFound)));
    }

    #[test]
    fn test_update_overwrites_all_fields() {
        let (_temp_dir, repo) = create_test_repo();
        let id = repo.insert(&make_song("Muse", "Uprising")).unwrap();

        let changed = Song {
            id: 999,
            group_name: "MUSE".into(),
            song_name: "Uprising (Live)".into(),
            release_date: "2009".into(),
            text: "They will not force us".into(),
            link: "https://example.com/uprising".into(),
        };
        repo.update(id, &changed).unwrap();

        let songs = repo.list(&SongFilter::default()).unwrap();
        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0], Song { id, ..changed });
    }

    #[test]
    fn test_update_is_idempotent() {
        let (_temp_dir, repo) = create_test_repo();
        let id = repo.insert(&make_song("Muse", "Uprising")).unwrap();
        let changed = make_song("Muse", "Resistance");

        repo.update(id, &changed).unwrap();
        let once = repo.list(&SongFilter::default()).unwrap();
        repo.update(id, &changed).unwrap();
        let twice = repo.list(&SongFilter::default()).unwrap();

        assert_eq!(once, twice);
    }

    #[test]
    fn test_update_missing_is_not_found() {
        let (_temp_dir, repo) = create_test_repo();
        let result = repo.update(7, &make_song("Muse", "Uprising"));
        assert!(matches!(result, Err(StoreError::NotFound)));
    }

    #[test]
    fn test_storage_fault_is_not_reported_as_not_found() {
        let (_temp_dir, repo) = create_test_repo();
        let id = repo.insert(&make_song("Muse", "Uprising")).unwrap();
        repo.pool
            .get()
            .unwrap()
            .execute_batch("DROP TABLE songs")
            .unwrap();

        let result = repo.update(id, &make_song("Muse", "Resistance"));
        assert!(matches!(result, Err(StoreError::Database(_))), "{result:?}");

        let result = repo.delete(id);
        assert!(matches!(result, Err(StoreError::Database(_))), "{result:?}");
    }
}
