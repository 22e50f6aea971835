//! SQLite-backed item cache implementation.

use std::path::Path;
use std::sync::Mutex;

use chrono::Utc;
use rusqlite::{params, Connection};

use super::{CacheError, ItemCache};
use crate::extract::Item;

/// SQLite-backed item cache.
pub struct SqliteItemCache {
    conn: Mutex<Connection>,
}

impl SqliteItemCache {
    /// Create a new SQLite cache, creating the database file and tables if
    /// needed.
    pub fn new(path: &Path) -> Result<Self, CacheError> {
        let conn = Connection::open(path).map_err(|e| CacheError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory cache (useful for testing).
    pub fn in_memory() -> Result<Self, CacheError> {
        let conn =
            Connection::open_in_memory().map_err(|e| CacheError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), CacheError> {
        conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            -- One row per tracker item; genres persisted as a JSON array to
            -- keep their page order.
            CREATE TABLE IF NOT EXISTS items (
                id INTEGER PRIMARY KEY,
                imdb_id INTEGER,
                orig_title TEXT,
                aka_title TEXT,
                director TEXT,
                year TEXT,
                country TEXT,
                genres TEXT NOT NULL DEFAULT '[]',
                source TEXT,
                language TEXT,
                media_type TEXT,
                fetched_at TEXT NOT NULL
            );

            -- File paths per item, insertion order = torrent order. No
            -- uniqueness on path: duplicates are legitimate.
            CREATE TABLE IF NOT EXISTS files (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                item_id INTEGER NOT NULL REFERENCES items(id) ON DELETE CASCADE,
                path TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_files_item ON files(item_id);
            "#,
        )
        .map_err(|e| CacheError::Database(e.to_string()))?;

        Ok(())
    }
}

impl ItemCache for SqliteItemCache {
    fn retrieve(&self, id: u32) -> Result<Item, CacheError> {
        let conn = self.conn.lock().unwrap();

        let (item_no_genres, genres_json) = conn
            .query_row(
                "SELECT imdb_id, orig_title, aka_title, director, year, country,
                        genres, source, language, media_type
                 FROM items WHERE id = ?1",
                params![id],
                |row| {
                    let genres_json: String = row.get(6)?;
                    Ok((
                        Item {
                            id,
                            imdb_id: row.get(0)?,
                            orig_title: row.get(1)?,
                            aka_title: row.get(2)?,
                            director: row.get(3)?,
                            year: row.get(4)?,
                            country: row.get(5)?,
                            genres: Vec::new(),
                            source: row.get(7)?,
                            language: row.get(8)?,
                            media_type: row.get(9)?,
                            files: Vec::new(),
                        },
                        genres_json,
                    ))
                },
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => CacheError::NotFound(id),
                _ => CacheError::Database(e.to_string()),
            })?;

        let mut item = item_no_genres;
        item.genres = serde_json::from_str(&genres_json).map_err(|e| CacheError::Integrity {
            id,
            reason: format!("genres column is not a JSON array: {e}"),
        })?;

        let mut stmt = conn
            .prepare("SELECT path FROM files WHERE item_id = ?1 ORDER BY id")
            .map_err(|e| CacheError::Database(e.to_string()))?;
        let rows = stmt
            .query_map(params![id], |row| row.get::<_, String>(0))
            .map_err(|e| CacheError::Database(e.to_string()))?;
        for row in rows {
            item.files
                .push(row.map_err(|e| CacheError::Database(e.to_string()))?);
        }

        Ok(item)
    }

    fn store(&self, item: &Item) -> Result<(), CacheError> {
        let genres_json =
            serde_json::to_string(&item.genres).map_err(|e| CacheError::Database(e.to_string()))?;
        let now = Utc::now().to_rfc3339();

        let mut conn = self.conn.lock().unwrap();
        let tx = conn
            .transaction()
            .map_err(|e| CacheError::Database(e.to_string()))?;

        tx.execute(
            "INSERT INTO items (id, imdb_id, orig_title, aka_title, director, year,
                                country, genres, source, language, media_type, fetched_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
             ON CONFLICT(id) DO UPDATE SET
                imdb_id = excluded.imdb_id,
                orig_title = excluded.orig_title,
                aka_title = excluded.aka_title,
                director = excluded.director,
                year = excluded.year,
                country = excluded.country,
                genres = excluded.genres,
                source = excluded.source,
                language = excluded.language,
                media_type = excluded.media_type,
                fetched_at = excluded.fetched_at",
            params![
                item.id,
                item.imdb_id,
                item.orig_title,
                item.aka_title,
                item.director,
                item.year,
                item.country,
                genres_json,
                item.source,
                item.language,
                item.media_type,
                now,
            ],
        )
        .map_err(|e| CacheError::Database(e.to_string()))?;

        tx.execute("DELETE FROM files WHERE item_id = ?1", params![item.id])
            .map_err(|e| CacheError::Database(e.to_string()))?;
        for path in &item.files {
            tx.execute(
                "INSERT INTO files (item_id, path) VALUES (?1, ?2)",
                params![item.id, path],
            )
            .map_err(|e| CacheError::Database(e.to_string()))?;
        }

        tx.commit().map_err(|e| CacheError::Database(e.to_string()))
    }
}
