//! SQLite persistence for the extraction cache
//!
//! The cache file is written once, after extraction, and trusted on every later run.
//! Reading never falls back to recomputation: anything unreadable is reported as
//! cache corruption.

use crate::error::{CharnetError, Result};
use crate::storage::schema::*;
use crate::storage::{CacheTable, EpisodeRecord, decode_ners, encode_ners};
use crate::utils::ensure_parent_directory;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OpenFlags, OptionalExtension, params};
use std::path::{Path, PathBuf};

/// Cache database connection and operations
pub struct CacheDatabase {
    conn: Connection,
    path: PathBuf,
}

impl CacheDatabase {
    /// Create (or reuse) a cache file for writing, creating parent directories as needed
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        ensure_parent_directory(path)?;

        let conn = Connection::open(path)
            .map_err(|e| CharnetError::Storage(format!("Failed to open cache: {}", e)))?;

        let db = Self {
            conn,
            path: path.to_path_buf(),
        };
        db.initialize()?;
        Ok(db)
    }

    /// Open an existing cache file read-only
    pub fn open_existing<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| corruption(path, format!("cannot open cache: {}", e)))?;

        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    /// Create an in-memory cache (for testing)
    pub fn memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| {
            CharnetError::Storage(format!("Failed to create in-memory cache: {}", e))
        })?;

        let db = Self {
            conn,
            path: PathBuf::from(":memory:"),
        };
        db.initialize()?;
        Ok(db)
    }

    fn initialize(&self) -> Result<()> {
        self.conn
            .execute(CREATE_EPISODES_TABLE, [])
            .map_err(|e| CharnetError::Storage(format!("Failed to create episodes table: {}", e)))?;

        self.conn
            .execute(CREATE_METADATA_TABLE, [])
            .map_err(|e| CharnetError::Storage(format!("Failed to create metadata table: {}", e)))?;

        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the cached table with `table` in one transaction
    pub fn write_table(&mut self, table: &CacheTable) -> Result<()> {
        let tx = self
            .conn
            .transaction()
            .map_err(|e| CharnetError::Storage(format!("Failed to start transaction: {}", e)))?;

        tx.execute("DELETE FROM episodes", [])
            .map_err(|e| CharnetError::Storage(format!("Failed to clear episodes: {}", e)))?;

        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO episodes (position, episode_id, script, ners) VALUES (?, ?, ?, ?)",
                )
                .map_err(|e| CharnetError::Storage(format!("Failed to prepare statement: {}", e)))?;

            for (position, episode) in table.iter().enumerate() {
                let ners = encode_ners(&episode.ners)?;
                stmt.execute(params![
                    position as i64,
                    episode.episode_id,
                    episode.script,
                    ners
                ])
                .map_err(|e| {
                    CharnetError::Storage(format!(
                        "Failed to insert episode {}: {}",
                        episode.episode_id, e
                    ))
                })?;
            }
        }

        tx.execute(
            "INSERT OR REPLACE INTO metadata (key, value) VALUES ('schema_version', ?)",
            params![SCHEMA_VERSION.to_string()],
        )
        .map_err(|e| CharnetError::Storage(format!("Failed to set schema version: {}", e)))?;

        tx.execute(
            "INSERT OR REPLACE INTO metadata (key, value) VALUES ('created_at', ?)",
            params![Utc::now().to_rfc3339()],
        )
        .map_err(|e| CharnetError::Storage(format!("Failed to set creation time: {}", e)))?;

        tx.commit()
            .map_err(|e| CharnetError::Storage(format!("Failed to commit transaction: {}", e)))?;

        log::info!(
            "Wrote {} episodes to cache {}",
            table.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Read the whole cached table in dataset order.
    ///
    /// A cache without a committed schema version was never completely written
    /// and is reported as corrupt.
    pub fn read_table(&self) -> Result<CacheTable> {
        if self.schema_version()?.is_none() {
            return Err(corruption(
                &self.path,
                "no schema version recorded, the cache was never completely written".to_string(),
            ));
        }

        let mut stmt = self
            .conn
            .prepare(SELECT_EPISODES)
            .map_err(|e| corruption(&self.path, format!("unreadable episodes table: {}", e)))?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })
            .map_err(|e| corruption(&self.path, format!("failed to query episodes: {}", e)))?;

        let mut episodes = Vec::new();
        for row in rows {
            let (episode_id, script, encoded) =
                row.map_err(|e| corruption(&self.path, format!("bad episode row: {}", e)))?;

            let ners = decode_ners(&encoded).map_err(|reason| {
                corruption(&self.path, format!("episode {}: {}", episode_id, reason))
            })?;

            episodes.push(EpisodeRecord {
                episode_id,
                script,
                ners,
            });
        }

        log::debug!(
            "Read {} episodes from cache {}",
            episodes.len(),
            self.path.display()
        );
        Ok(CacheTable::new(episodes))
    }

    /// Number of cached episodes
    pub fn episode_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM episodes", [], |row| row.get(0))
            .map_err(|e| corruption(&self.path, format!("failed to count episodes: {}", e)))?;

        Ok(count as usize)
    }

    fn metadata(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM metadata WHERE key = ?",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| corruption(&self.path, format!("failed to read metadata: {}", e)))
    }

    /// When the cache was written, if recorded
    pub fn created_at(&self) -> Result<Option<DateTime<Utc>>> {
        let Some(value) = self.metadata("created_at")? else {
            return Ok(None);
        };

        DateTime::parse_from_rfc3339(&value)
            .map(|t| Some(t.with_timezone(&Utc)))
            .map_err(|e| corruption(&self.path, format!("bad created_at {:?}: {}", value, e)))
    }

    /// Schema version the cache was written with, if recorded
    pub fn schema_version(&self) -> Result<Option<u32>> {
        Ok(self
            .metadata("schema_version")?
            .and_then(|value| value.parse().ok()))
    }

    /// Summary figures for display
    pub fn stats(&self) -> Result<CacheStats> {
        let file_size: i64 = self
            .conn
            .query_row(
                "SELECT page_count * page_size FROM pragma_page_count(), pragma_page_size()",
                [],
                |row| row.get(0),
            )
            .map_err(|e| CharnetError::Storage(format!("Failed to get cache size: {}", e)))?;

        Ok(CacheStats {
            episode_count: self.episode_count()?,
            schema_version: self.schema_version()?,
            created_at: self.created_at()?,
            file_size_bytes: file_size as usize,
        })
    }
}

/// Cache statistics
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub episode_count: usize,
    pub schema_version: Option<u32>,
    pub created_at: Option<DateTime<Utc>>,
    pub file_size_bytes: usize,
}

fn corruption(path: &Path, reason: String) -> CharnetError {
    CharnetError::CacheCorruption {
        path: path.to_path_buf(),
        reason,
    }
}

/// Load a previously written cache file
pub fn load_cache<P: AsRef<Path>>(path: P) -> Result<CacheTable> {
    CacheDatabase::open_existing(path)?.read_table()
}

/// Persist `table` to `path`, replacing any prior contents.
///
/// The table is written to a sibling `.partial` file that is renamed into place
/// only after the write commits, so `path` never holds an unfinished cache.
pub fn save_cache<P: AsRef<Path>>(path: P, table: &CacheTable) -> Result<()> {
    let path = path.as_ref();
    let staging = staging_path(path)?;
    if staging.exists() {
        std::fs::remove_file(&staging)?;
    }

    let written = CacheDatabase::create(&staging).and_then(|mut db| db.write_table(table));
    if let Err(e) = written {
        let _ = std::fs::remove_file(&staging);
        return Err(e);
    }

    std::fs::rename(&staging, path).map_err(|e| {
        let _ = std::fs::remove_file(&staging);
        CharnetError::Storage(format!(
            "Failed to move cache into place at {}: {}",
            path.display(),
            e
        ))
    })?;

    log::debug!("Cache committed to {}", path.display());
    Ok(())
}

fn staging_path(path: &Path) -> Result<PathBuf> {
    let name = path.file_name().ok_or_else(|| {
        CharnetError::Storage(format!("Cache path {} has no file name", path.display()))
    })?;
    let mut staged = name.to_os_string();
    staged.push(".partial");
    Ok(path.with_file_name(staged))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_table() -> CacheTable {
        CacheTable::new(vec![
            EpisodeRecord {
                episode_id: "1".to_string(),
                script: "Naruto met Sasuke. It rained.".to_string(),
                ners: vec![
                    ["Naruto", "Sasuke"].into_iter().collect(),
                    Default::default(),
                ],
            },
            EpisodeRecord {
                episode_id: "2".to_string(),
                script: String::new(),
                ners: Vec::new(),
            },
        ])
    }

    #[test]
    fn test_memory_write_and_read() {
        let mut db = CacheDatabase::memory().unwrap();
        let table = sample_table();
        db.write_table(&table).unwrap();

        assert_eq!(db.read_table().unwrap(), table);
        assert_eq!(db.episode_count().unwrap(), 2);
        assert_eq!(db.schema_version().unwrap(), Some(SCHEMA_VERSION));
        assert!(db.created_at().unwrap().is_some());
    }

    #[test]
    fn test_rewrite_replaces_contents() {
        let mut db = CacheDatabase::memory().unwrap();
        db.write_table(&sample_table()).unwrap();
        db.write_table(&CacheTable::default()).unwrap();
        assert!(db.read_table().unwrap().is_empty());
    }

    #[test]
    fn test_file_cache_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache").join("ners.db");
        save_cache(&path, &sample_table()).unwrap();

        assert_eq!(load_cache(&path).unwrap(), sample_table());
        let stats = CacheDatabase::open_existing(&path).unwrap().stats().unwrap();
        assert_eq!(stats.episode_count, 2);
        assert!(stats.file_size_bytes > 0);
    }

    #[test]
    fn test_bad_ners_value_is_corruption() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ners.db");
        save_cache(&path, &sample_table()).unwrap();

        let conn = Connection::open(&path).unwrap();
        conn.execute("UPDATE episodes SET ners = 'not json' WHERE position = 0", [])
            .unwrap();
        drop(conn);

        assert!(matches!(
            load_cache(&path),
            Err(CharnetError::CacheCorruption { .. })
        ));
    }

    #[test]
    fn test_unfinished_cache_is_corruption() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ners.db");
        drop(CacheDatabase::create(&path).unwrap());

        assert!(matches!(
            load_cache(&path),
            Err(CharnetError::CacheCorruption { .. })
        ));
    }

    #[test]
    fn test_save_leaves_no_staging_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ners.db");
        save_cache(&path, &sample_table()).unwrap();

        assert!(path.exists());
        assert!(!staging_path(&path).unwrap().exists());
    }

    #[test]
    fn test_failed_save_leaves_no_cache() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ners.db");
        // A directory in the staging slot makes the write fail before anything lands
        std::fs::create_dir(staging_path(&path).unwrap()).unwrap();

        assert!(save_cache(&path, &sample_table()).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_non_sqlite_file_is_corruption() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ners.db");
        std::fs::write(&path, "this is plainly not a database file, just text").unwrap();

        assert!(matches!(
            load_cache(&path),
            Err(CharnetError::CacheCorruption { .. })
        ));
    }
}
