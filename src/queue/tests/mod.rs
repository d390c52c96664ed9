//! Test modules for the work queue
//!
//! Every test opens its queue on a file inside its own temporary directory.


use crate::queue::WorkQueue;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::TempDir;

pub(crate) fn temp_queue<T: Serialize + DeserializeOwned>() -> (TempDir, WorkQueue<T>) {
    let dir = tempfile::tempdir().unwrap();
    let queue = WorkQueue::open(dir.path().join("queue.db")).unwrap();
    (dir, queue)
}
