//! SQLite-backed work queue

use crate::core::retry::BackoffPolicy;
use crate::queue::error::{QueueError, QueueResult};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, TransactionBehavior};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// How long SQLite itself waits on a locked database before reporting busy
const BUSY_TIMEOUT: Duration = Duration::from_secs(30);

/// A pending queue entry
#[derive(Debug, Clone, PartialEq)]
pub struct WorkItem<T> {
    pub id: i64,
    pub payload: T,
}

/// Durable FIFO queue of serialisable jobs
///
/// Items are popped in ascending `id` order, which is insertion order. Any
/// number of processes may open the same file; each `WorkQueue` owns its own
/// connection and must not be shared between threads. Removal happens inside
/// an immediate (write-locked) transaction, so two consumers never receive
/// the same item.
pub struct WorkQueue<T> {
    path: PathBuf,
    conn: Connection,
    backoff: BackoffPolicy,
    _payload: PhantomData<fn() -> T>,
}

impl<T> std::fmt::Debug for WorkQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkQueue").field("path", &self.path).finish()
    }
}

impl<T> WorkQueue<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Open (creating if needed) the queue stored at `path`
    pub fn open(path: impl AsRef<Path>) -> QueueResult<Self> {
        Self::open_with_backoff(path, BackoffPolicy::default())
    }

    pub fn open_with_backoff(path: impl AsRef<Path>, backoff: BackoffPolicy) -> QueueResult<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| QueueError::Directory {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let conn = Connection::open(&path).map_err(|source| QueueError::Storage {
            path: path.clone(),
            source,
        })?;

        let queue = Self {
            path,
            conn,
            backoff,
            _payload: PhantomData,
        };
        queue.init_schema()?;
        log::debug!("Opened work queue at {}", queue.path.display());
        Ok(queue)
    }

    fn init_schema(&self) -> QueueResult<()> {
        self.conn
            .busy_timeout(BUSY_TIMEOUT)
            .map_err(|e| self.storage(e))?;
        self.conn
            .execute(
                "CREATE TABLE IF NOT EXISTS queue (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    payload BLOB NOT NULL
                )",
                [],
            )
            .map_err(|e| self.storage(e))?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist `item` at the tail of the queue and return its id
    ///
    /// The insert is committed before this returns.
    pub fn append(&self, item: &T) -> QueueResult<i64> {
        let payload = serde_json::to_vec(item).map_err(QueueError::Serialization)?;
        let mut backoff = self.backoff.start();
        loop {
            match self
                .conn
                .execute("INSERT INTO queue (payload) VALUES (?1)", params![payload])
            {
                Ok(_) => return Ok(self.conn.last_insert_rowid()),
                Err(e) if is_contention(&e) => {
                    let delay = backoff.next_delay();
                    log::debug!("Queue busy on append, retrying in {:?}", delay);
                    std::thread::sleep(delay);
                }
                Err(e) => return Err(self.storage(e)),
            }
        }
    }

    /// Remove and return the earliest item, or `None` if the queue is empty
    ///
    /// Lock contention with other consumers is retried here and never
    /// returned to the caller.
    pub fn try_pop(&mut self) -> QueueResult<Option<T>> {
        Ok(self.try_pop_item()?.map(|item| item.payload))
    }

    /// Like [`try_pop`](Self::try_pop) but keeps the item id
    pub fn try_pop_item(&mut self) -> QueueResult<Option<WorkItem<T>>> {
        let mut backoff = self.backoff.start();
        loop {
            match self.pop_once() {
                Ok(row) => return self.decode(row),
                Err(e) if is_contention(&e) => {
                    let delay = backoff.next_delay();
                    log::debug!("Queue busy on pop, retrying in {:?}", delay);
                    std::thread::sleep(delay);
                }
                Err(e) => return Err(self.storage(e)),
            }
        }
    }

    // Async counterpart of `try_pop_item`. SQLite's own busy wait is switched
    // off for the attempt so contention is retried on the tokio timer and the
    // runtime thread is never parked.
    async fn pop_item_async(&mut self) -> QueueResult<Option<WorkItem<T>>> {
        let mut backoff = self.backoff.start();
        loop {
            match self.pop_once_no_wait() {
                Ok(row) => return self.decode(row),
                Err(e) if is_contention(&e) => {
                    let delay = backoff.next_delay();
                    log::debug!("Queue busy on pop, retrying in {:?}", delay);
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(self.storage(e)),
            }
        }
    }

    fn pop_once_no_wait(&mut self) -> rusqlite::Result<Option<(i64, Vec<u8>)>> {
        self.conn.busy_timeout(Duration::ZERO)?;
        let result = self.pop_once();
        self.conn.busy_timeout(BUSY_TIMEOUT)?;
        result
    }

    fn decode(&self, row: Option<(i64, Vec<u8>)>) -> QueueResult<Option<WorkItem<T>>> {
        let Some((id, payload)) = row else {
            return Ok(None);
        };
        let payload = serde_json::from_slice(&payload)
            .map_err(|source| QueueError::Corrupt { id, source })?;
        Ok(Some(WorkItem { id, payload }))
    }

    // BEGIN IMMEDIATE / SELECT / DELETE / COMMIT. The row is gone once this
    // returns, even if its payload later fails to decode.
    fn pop_once(&mut self) -> rusqlite::Result<Option<(i64, Vec<u8>)>> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let row: Option<(i64, Vec<u8>)> = tx
            .query_row(
                "SELECT id, payload FROM queue ORDER BY id LIMIT 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        if let Some((id, _)) = &row {
            tx.execute("DELETE FROM queue WHERE id = ?1", params![id])?;
        }
        tx.commit()?;
        Ok(row)
    }

    /// Pop, optionally waiting for an item to arrive
    ///
    /// Non-blocking mode returns the earliest item or `None` at once. Blocking
    /// mode polls with capped exponential backoff until an item appears or
    /// `timeout` (if any) elapses, in which case `None` is returned. Lock
    /// contention is waited out on the tokio timer in both modes.
    pub async fn pop(&mut self, blocking: bool, timeout: Option<Duration>) -> QueueResult<Option<T>> {
        if !blocking {
            return Ok(self.pop_item_async().await?.map(|item| item.payload));
        }

        let deadline = timeout.map(|t| Instant::now() + t);
        let mut backoff = self.backoff.start();
        loop {
            if let Some(item) = self.pop_item_async().await? {
                return Ok(Some(item.payload));
            }

            let mut delay = backoff.next_delay();
            if let Some(deadline) = deadline {
                let now = Instant::now();
                if now >= deadline {
                    return Ok(None);
                }
                delay = delay.min(deadline - now);
            }
            tokio::time::sleep(delay).await;
        }
    }

    /// Return the earliest item without removing it
    pub fn peek(&self) -> QueueResult<Option<T>> {
        let row: Option<(i64, Vec<u8>)> = self
            .conn
            .query_row(
                "SELECT id, payload FROM queue ORDER BY id LIMIT 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(|e| self.storage(e))?;

        row.map(|(id, payload)| {
            serde_json::from_slice(&payload).map_err(|source| QueueError::Corrupt { id, source })
        })
        .transpose()
    }

    /// Number of pending items
    pub fn len(&self) -> QueueResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM queue", [], |row| row.get(0))
            .map_err(|e| self.storage(e))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    pub fn is_empty(&self) -> QueueResult<bool> {
        Ok(self.len()? == 0)
    }

    /// All pending items in pop order, without removing them
    ///
    /// Rows whose payload cannot be decoded are skipped with a warning.
    pub fn snapshot(&self) -> QueueResult<Vec<WorkItem<T>>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, payload FROM queue ORDER BY id")
            .map_err(|e| self.storage(e))?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, Vec<u8>>(1)?)))
            .map_err(|e| self.storage(e))?;

        let mut items = Vec::new();
        for row in rows {
            let (id, payload) = row.map_err(|e| self.storage(e))?;
            match serde_json::from_slice(&payload) {
                Ok(payload) => items.push(WorkItem { id, payload }),
                Err(e) => log::warn!("Skipping unreadable queue entry {}: {}", id, e),
            }
        }
        Ok(items)
    }

    /// Drop every pending item and return how many were removed
    pub fn clear(&mut self) -> QueueResult<usize> {
        let removed = self.clear_once().map_err(|e| self.storage(e))?;
        log::info!("Cleared {} item(s) from the work queue", removed);
        Ok(removed)
    }

    fn clear_once(&mut self) -> rusqlite::Result<usize> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let removed = tx.execute("DELETE FROM queue", [])?;
        tx.commit()?;
        Ok(removed)
    }

    fn storage(&self, source: rusqlite::Error) -> QueueError {
        QueueError::Storage {
            path: self.path.clone(),
            source,
        }
    }
}

fn is_contention(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if matches!(e.code, ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked)
    )
}
