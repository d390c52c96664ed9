//! Plugin Context
//!
//! Everything an analysis plugin may touch while analysing one file. The
//! context is built by the orchestrator per file; there is no global state
//! behind it.

use crate::core::config::Config;
use crate::queue::{Job, QueueError, QueueResult, WorkQueue};
use crate::store::{FileHashes, MetadataStore};
use std::path::Path;
use std::sync::Mutex;

/// Append-only handle on the work queue for plugins that find new files
///
/// Owns its own queue connection so it never contends with the drain loop's
/// connection inside one process.
pub struct JobSink {
    queue: Mutex<WorkQueue<Job>>,
}

impl std::fmt::Debug for JobSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobSink").finish_non_exhaustive()
    }
}

impl JobSink {
    pub fn open(path: &Path) -> QueueResult<Self> {
        Ok(Self::new(WorkQueue::open(path)?))
    }

    pub fn new(queue: WorkQueue<Job>) -> Self {
        Self {
            queue: Mutex::new(queue),
        }
    }

    /// Queue `job` for a later run of the drain loop
    pub fn submit(&self, job: &Job) -> QueueResult<i64> {
        let queue = self.queue.lock().map_err(|_| QueueError::Poisoned)?;
        let id = queue.append(job)?;
        log::debug!("Queued {} as job {}", job.path().display(), id);
        Ok(id)
    }
}

/// Per-file view handed to [`AnalysisPlugin::analyze`](crate::plugin::traits::AnalysisPlugin::analyze)
///
/// `config` is read-only here; the per-file values (`Dir.log_dir`,
/// `Misc.md5`, `Misc.sha1`, `Misc.sha256`) have already been written by the
/// orchestrator.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisContext<'a> {
    pub config: &'a Config,
    /// File being analysed
    pub path: &'a Path,
    /// Per-file output directory
    pub log_dir: &'a Path,
    pub hashes: &'a FileHashes,
    pub sample_id: Option<i64>,
    pub store: Option<&'a MetadataStore>,
    pub feedback: Option<&'a JobSink>,
}

impl<'a> AnalysisContext<'a> {
    pub fn new(
        config: &'a Config,
        path: &'a Path,
        log_dir: &'a Path,
        hashes: &'a FileHashes,
    ) -> Self {
        Self {
            config,
            path,
            log_dir,
            hashes,
            sample_id: None,
            store: None,
            feedback: None,
        }
    }

    pub fn with_store(mut self, store: &'a MetadataStore, sample_id: Option<i64>) -> Self {
        self.store = Some(store);
        self.sample_id = sample_id;
        self
    }

    pub fn with_feedback(mut self, sink: &'a JobSink) -> Self {
        self.feedback = Some(sink);
        self
    }

    /// `[<section>] enabled`, defaulting to on
    pub fn plugin_enabled(&self, section: &str) -> bool {
        self.config.get_bvar(section, "enabled").unwrap_or(true)
    }
}
