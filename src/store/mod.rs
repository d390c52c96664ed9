//! Metadata persistence
//!
//! Every analysed sample gets a row in `samples` (digests plus the
//! categories it was classified into). The File Information plugin adds
//! one row per file name in `files` with first/last seen times and a count.
//! The tables live in the same SQLite file as the work queue.

pub mod error;
pub mod hashes;

pub use error::{StoreError, StoreResult};
pub use hashes::FileHashes;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// Recorded sighting of one file name for a sample
#[derive(Debug, Clone, PartialEq)]
pub struct FileRecord {
    pub id: i64,
    pub sample_id: i64,
    pub filename: String,
    pub size: u64,
    pub first_seen: i64,
    pub last_seen: i64,
    pub times: i64,
}

/// SQLite metadata store
///
/// The connection sits behind a mutex so plugins can share the store
/// through the analysis context.
pub struct MetadataStore {
    path: PathBuf,
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for MetadataStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataStore")
            .field("path", &self.path)
            .finish()
    }
}

impl MetadataStore {
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let conn = Connection::open(&path).map_err(|source| StoreError::Open {
            path: path.clone(),
            source,
        })?;
        Self::init_database(&conn).map_err(|source| StoreError::Open {
            path: path.clone(),
            source,
        })?;
        log::debug!("Opened metadata store at {}", path.display());
        Ok(Self {
            path,
            conn: Mutex::new(conn),
        })
    }

    fn init_database(conn: &Connection) -> rusqlite::Result<()> {
        conn.busy_timeout(Duration::from_secs(30))?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS samples (
                id INTEGER PRIMARY KEY,
                md5 TEXT NOT NULL,
                sha1 TEXT NOT NULL,
                sha256 TEXT NOT NULL,
                categories TEXT DEFAULT NULL,
                UNIQUE (sha1, sha256)
            )",
            [],
        )?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS files (
                id INTEGER PRIMARY KEY,
                sid INTEGER NOT NULL,
                filename TEXT NOT NULL,
                size INTEGER NOT NULL,
                firstseen INTEGER NOT NULL,
                lastseen INTEGER NOT NULL,
                times INTEGER NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Id of the sample with these digests, if recorded
    pub fn sample_id(&self, hashes: &FileHashes) -> StoreResult<Option<i64>> {
        let conn = self.lock()?;
        let id = conn
            .query_row(
                "SELECT id FROM samples WHERE sha1 = ?1 AND sha256 = ?2",
                params![hashes.sha1, hashes.sha256],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    /// Insert the sample if new and return its id
    pub fn record_sample(&self, hashes: &FileHashes) -> StoreResult<i64> {
        {
            let conn = self.lock()?;
            conn.execute(
                "INSERT OR IGNORE INTO samples (md5, sha1, sha256) VALUES (?1, ?2, ?3)",
                params![hashes.md5, hashes.sha1, hashes.sha256],
            )?;
        }
        match self.sample_id(hashes)? {
            Some(id) => Ok(id),
            None => Err(StoreError::Query(rusqlite::Error::QueryReturnedNoRows)),
        }
    }

    /// Store the categories a sample was classified into
    pub fn set_categories(&self, sample_id: i64, categories: &[String]) -> StoreResult<()> {
        let encoded = categories.join(",");
        log::info!("Adding categories [{}] for sample {}", encoded, sample_id);
        let conn = self.lock()?;
        let updated = conn.execute(
            "UPDATE samples SET categories = ?1 WHERE id = ?2",
            params![encoded, sample_id],
        )?;
        if updated == 0 {
            return Err(StoreError::UnknownSample(sample_id));
        }
        Ok(())
    }

    pub fn categories(&self, sample_id: i64) -> StoreResult<Vec<String>> {
        let conn = self.lock()?;
        let encoded: Option<String> = conn
            .query_row(
                "SELECT categories FROM samples WHERE id = ?1",
                params![sample_id],
                |row| row.get(0),
            )
            .optional()?
            .ok_or(StoreError::UnknownSample(sample_id))?;
        Ok(encoded
            .map(|s| {
                s.split(',')
                    .filter(|c| !c.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default())
    }

    /// Note that `filename` was analysed as `sample_id` at `seen`
    ///
    /// A repeat sighting bumps `lastseen` and the counter.
    pub fn record_file_seen(
        &self,
        sample_id: i64,
        filename: &str,
        size: u64,
        seen: DateTime<Utc>,
    ) -> StoreResult<FileRecord> {
        let timestamp = seen.timestamp();
        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;

        let existing: Option<(i64, i64)> = tx
            .query_row(
                "SELECT id, times FROM files WHERE filename = ?1 AND sid = ?2",
                params![filename, sample_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match existing {
            Some((id, times)) => {
                log::debug!("{} is already recorded for this sample; updating times", filename);
                tx.execute(
                    "UPDATE files SET lastseen = ?1, times = ?2 WHERE id = ?3",
                    params![timestamp, times + 1, id],
                )?;
            }
            None => {
                tx.execute(
                    "INSERT INTO files (sid, filename, size, firstseen, lastseen, times)
                     VALUES (?1, ?2, ?3, ?4, ?4, 1)",
                    params![sample_id, filename, size as i64, timestamp],
                )?;
            }
        }

        let record = tx.query_row(
            "SELECT id, sid, filename, size, firstseen, lastseen, times
             FROM files WHERE filename = ?1 AND sid = ?2",
            params![filename, sample_id],
            |row| {
                Ok(FileRecord {
                    id: row.get(0)?,
                    sample_id: row.get(1)?,
                    filename: row.get(2)?,
                    size: row.get::<_, i64>(3)?.max(0) as u64,
                    first_seen: row.get(4)?,
                    last_seen: row.get(5)?,
                    times: row.get(6)?,
                })
            },
        )?;
        tx.commit()?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn temp_store() -> (tempfile::TempDir, MetadataStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = MetadataStore::open(dir.path().join("filehound.db")).unwrap();
        (dir, store)
    }

    #[test]
    fn test_record_sample_is_idempotent() {
        let (_dir, store) = temp_store();
        let hashes = FileHashes::from_bytes(b"sample");
        let first = store.record_sample(&hashes).unwrap();
        let second = store.record_sample(&hashes).unwrap();
        assert_eq!(first, second);
        assert_eq!(store.sample_id(&hashes).unwrap(), Some(first));

        let other = store.record_sample(&FileHashes::from_bytes(b"other")).unwrap();
        assert_ne!(first, other);
    }

    #[test]
    fn test_sample_row_keeps_md5() {
        let (_dir, store) = temp_store();
        let hashes = FileHashes::from_bytes(b"sample");
        let id = store.record_sample(&hashes).unwrap();
        let md5: String = store
            .lock()
            .unwrap()
            .query_row("SELECT md5 FROM samples WHERE id = ?1", params![id], |row| row.get(0))
            .unwrap();
        assert_eq!(md5, hashes.md5);
    }

    #[test]
    fn test_categories_round_trip() {
        let (_dir, store) = temp_store();
        let id = store.record_sample(&FileHashes::from_bytes(b"pdf")).unwrap();
        assert!(store.categories(id).unwrap().is_empty());

        store
            .set_categories(id, &["Generic".to_string(), "PDF".to_string()])
            .unwrap();
        assert_eq!(store.categories(id).unwrap(), vec!["Generic", "PDF"]);
        assert!(matches!(
            store.set_categories(id + 100, &[]),
            Err(StoreError::UnknownSample(_))
        ));
    }

    #[test]
    fn test_file_sightings_are_counted() {
        let (_dir, store) = temp_store();
        let id = store.record_sample(&FileHashes::from_bytes(b"exe")).unwrap();
        let first_time = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();

        let first = store.record_file_seen(id, "/tmp/a.exe", 1024, first_time).unwrap();
        assert_eq!(first.times, 1);
        assert_eq!(first.first_seen, first.last_seen);

        let again = store.record_file_seen(id, "/tmp/a.exe", 1024, later).unwrap();
        assert_eq!(again.id, first.id);
        assert_eq!(again.times, 2);
        assert_eq!(again.first_seen, first_time.timestamp());
        assert_eq!(again.last_seen, later.timestamp());

        let renamed = store.record_file_seen(id, "/tmp/b.exe", 1024, later).unwrap();
        assert_ne!(renamed.id, first.id);
        assert_eq!(renamed.times, 1);
    }

    #[test]
    fn test_store_shares_file_with_queue() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("filehound.db");
        let queue: crate::queue::WorkQueue<crate::queue::Job> =
            crate::queue::WorkQueue::open(&db).unwrap();
        let store = MetadataStore::open(&db).unwrap();

        queue.append(&crate::queue::Job::analyze("/tmp/x")).unwrap();
        store.record_sample(&FileHashes::from_bytes(b"x")).unwrap();
        assert_eq!(queue.len().unwrap(), 1);
    }

    #[test]
    fn test_open_in_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = MetadataStore::open(dir.path().join("no").join("such").join("db"));
        assert!(matches!(result, Err(StoreError::Open { .. })));
    }
}
