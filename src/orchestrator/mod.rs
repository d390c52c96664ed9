//! Analysis Orchestrator
//!
//! Owns everything that lives for the whole process (configuration, store,
//! queue, plugin registry, classifier) and runs the per-file pipeline:
//!
//! ```text
//! hash ─► output dir ─► record sample ─► signals ─► classify
//!   ─► activate ─► analyze ─► deactivate ─► render ─► dump config
//! ```
//!
//! Each file gets its own copy of the configuration with the derived values
//! (`Dir.base_dir`, `Dir.log_dir`, `Misc.md5`, `Misc.sha1`, `Misc.sha256`)
//! filled in.

pub mod error;

pub use error::{OrchestratorError, OrchestratorResult};

use crate::classify::{Classification, ClassifiedFile, Classifier, IdentitySignals};
use crate::core::config::{expand_home, Config};
use crate::output::render_all;
use crate::plugin::api::{
    activate_plugins, collect_report, deactivate_all, discover, run_plugins, ActivationReport,
    ActivePlugin, AnalysisContext, JobSink, PluginOutcome, PluginRegistry,
};
use crate::queue::{Job, QueueError, WorkQueue};
use crate::results::Report;
use crate::store::{FileHashes, MetadataStore};
use std::path::{Path, PathBuf};

const DEFAULT_DB_FILE: &str = "filehound.db";

/// Per-run overrides from the command line
#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    /// Category added to every file regardless of its signals
    pub forced_category: Option<String>,
    /// Run only the plugin with this name
    pub single_plugin: Option<String>,
}

/// Everything known about one analysed file
#[derive(Debug)]
pub struct AnalysisReport {
    pub path: PathBuf,
    pub hashes: FileHashes,
    pub sample_id: i64,
    pub out_dir: PathBuf,
    pub classification: Classification,
    pub activation: ActivationReport,
    /// Plugins that declined
    pub declined: Vec<String>,
    /// Plugins that failed, with the reason
    pub failed: Vec<(String, String)>,
    pub report: Report,
    /// Files written by the renderers
    pub outputs: Vec<PathBuf>,
}

/// Totals for one drain of the queue
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainSummary {
    pub analyzed: usize,
    pub failed: usize,
}

pub struct Orchestrator {
    config: Config,
    base_dir: PathBuf,
    store: MetadataStore,
    queue: WorkQueue<Job>,
    sink: JobSink,
    registry: PluginRegistry,
    classifier: Classifier,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("base_dir", &self.base_dir)
            .field("plugins", &self.registry.plugin_count())
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// Prepare the base directory, database and plugins
    ///
    /// Any error here is fatal for the process.
    pub fn new(config: Config) -> OrchestratorResult<Self> {
        let registry = discover(&config);
        Self::with_registry(config, registry)
    }

    pub fn with_registry(mut config: Config, registry: PluginRegistry) -> OrchestratorResult<Self> {
        let base_dir = base_dir(&config);
        std::fs::create_dir_all(&base_dir).map_err(|source| OrchestratorError::Directory {
            path: base_dir.clone(),
            source,
        })?;
        config.set_var("Dir", "base_dir", base_dir.display().to_string());

        let db_path = database_path(&config, &base_dir);
        log::debug!("Using database {}", db_path.display());
        let store = MetadataStore::open(&db_path)?;
        let queue = WorkQueue::open(&db_path)?;
        let sink = JobSink::open(&db_path)?;

        for failure in registry.failures() {
            log::info!("Plugin {} not loaded: {}", failure.source, failure.error);
        }

        Ok(Self {
            config,
            base_dir,
            store,
            queue,
            sink,
            registry,
            classifier: Classifier::default(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn store(&self) -> &MetadataStore {
        &self.store
    }

    pub fn queue(&self) -> &WorkQueue<Job> {
        &self.queue
    }

    /// Run the whole pipeline for one file
    pub async fn analyze_file(
        &self,
        path: &Path,
        options: &AnalyzeOptions,
    ) -> OrchestratorResult<AnalysisReport> {
        if !path.is_file() {
            return Err(OrchestratorError::InvalidInput {
                path: path.to_path_buf(),
            });
        }
        log::info!("Starting analysis on {}", path.display());

        let hashes = FileHashes::compute(path).map_err(|source| OrchestratorError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let out_dir = self.base_dir.join(&hashes.sha256);
        std::fs::create_dir_all(&out_dir).map_err(|source| OrchestratorError::Directory {
            path: out_dir.clone(),
            source,
        })?;
        log::debug!("Output directory is {}", out_dir.display());

        let mut config = self.config.clone();
        config.set_var("Dir", "log_dir", out_dir.display().to_string());
        config.set_var("Misc", "md5", hashes.md5.clone());
        config.set_var("Misc", "sha1", hashes.sha1.clone());
        config.set_var("Misc", "sha256", hashes.sha256.clone());

        if config.get_bvar("Misc", "copy").unwrap_or(false) {
            copy_sample(path, &out_dir);
        }

        let sample_id = self.store.record_sample(&hashes)?;

        let signals = IdentitySignals::gather(path, &config).await;
        let file = ClassifiedFile::new(path, signals, options.forced_category.clone());
        let classification = self.classifier.classify(&file).clone();
        log::info!(
            "File categories are {}",
            classification.categories.join(", ")
        );
        self.store
            .set_categories(sample_id, &classification.categories)?;

        let mut active: Vec<ActivePlugin> = Vec::new();
        let activation = activate_plugins(
            &self.registry,
            &classification.categories,
            options.single_plugin.as_deref(),
            |category, descriptor| {
                let mut instance = descriptor.instantiate();
                instance.activate()?;
                active.push(ActivePlugin {
                    category: category.to_string(),
                    name: descriptor.name.clone(),
                    instance,
                });
                Ok(())
            },
        );
        if let Some(only) = options.single_plugin.as_deref() {
            if !self.registry.has_plugin(only) {
                log::warn!("Plugin \"{}\" is not registered", only);
            }
        }

        let ctx = AnalysisContext::new(&config, path, &out_dir, &hashes)
            .with_store(&self.store, Some(sample_id))
            .with_feedback(&self.sink);
        let records = run_plugins(&mut active, &ctx).await;
        deactivate_all(&mut active);

        let mut declined = Vec::new();
        let mut failed = Vec::new();
        for record in &records {
            match &record.outcome {
                PluginOutcome::Declined => declined.push(record.name.clone()),
                PluginOutcome::Failed(e) => failed.push((record.name.clone(), e.to_string())),
                PluginOutcome::Completed(_) => {}
            }
        }
        let report = collect_report(records);

        let outputs = render_all(&report, &out_dir, &config);
        if let Err(e) = config.dump(&out_dir) {
            log::warn!("{}", e);
        }
        log::info!("Finished analysis for {}", path.display());

        Ok(AnalysisReport {
            path: path.to_path_buf(),
            hashes,
            sample_id,
            out_dir,
            classification,
            activation,
            declined,
            failed,
            report,
            outputs,
        })
    }

    /// Queue a file, or every file below a directory
    ///
    /// Returns the number of jobs added.
    pub fn enqueue_path(&self, path: &Path) -> OrchestratorResult<usize> {
        let files = collect_files(path)?;
        for file in &files {
            self.queue.append(&Job::analyze(file))?;
        }
        log::info!("Queued {} files from {}", files.len(), path.display());
        Ok(files.len())
    }

    /// Analyse queued files until the queue is empty
    ///
    /// Includes jobs added by plugins during the drain. A file that fails
    /// never stops the drain; a queue storage error does.
    pub async fn drain_queue(&mut self, options: &AnalyzeOptions) -> OrchestratorResult<DrainSummary> {
        let mut summary = DrainSummary::default();
        loop {
            let job = match self.queue.pop(false, None).await {
                Ok(Some(job)) => job,
                Ok(None) => break,
                Err(e @ QueueError::Corrupt { .. }) => {
                    log::error!("Dropping unreadable job: {}", e);
                    summary.failed += 1;
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let Job::Analyze { path, origin } = &job;
            if let Some(origin) = origin {
                log::debug!("{} was extracted from {}", path.display(), origin);
            }

            match self.analyze_file(path, options).await {
                Ok(_) => summary.analyzed += 1,
                Err(e) => {
                    log::error!("Analysis of {} failed: {}", path.display(), e);
                    summary.failed += 1;
                }
            }

            match self.queue.len() {
                Ok(remaining) => log::info!("{} files remaining in queue", remaining),
                Err(e) => log::debug!("Could not count queue: {}", e),
            }
        }
        Ok(summary)
    }

    /// Drop every queued job
    pub fn clear_queue(&mut self) -> OrchestratorResult<usize> {
        let removed = self.queue.clear()?;
        log::info!("Cleared {} jobs from the queue", removed);
        Ok(removed)
    }
}

/// `path` itself if it is a file, else every file below the directory
///
/// Entries of a directory that cannot be read are skipped.
pub fn collect_files(path: &Path) -> OrchestratorResult<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        return Err(OrchestratorError::InvalidInput {
            path: path.to_path_buf(),
        });
    }

    let pattern = format!(
        "{}/**/*",
        glob::Pattern::escape(&path.display().to_string())
    );
    let entries = glob::glob(&pattern).map_err(|_| OrchestratorError::InvalidInput {
        path: path.to_path_buf(),
    })?;

    let mut files = Vec::new();
    for entry in entries {
        match entry {
            Ok(file) if file.is_file() => files.push(file),
            Ok(_) => {}
            Err(e) => log::warn!("Skipping {}", e),
        }
    }
    Ok(files)
}

/// Resolved `[Dir] log_dir`
pub fn base_dir(config: &Config) -> PathBuf {
    let dir = config
        .get_var("Dir", "log_dir")
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| "/var/log/filehound".to_string());
    expand_home(&dir)
}

/// `[Sqlite] db_file`, relative to the base directory unless absolute
pub fn database_path(config: &Config, base_dir: &Path) -> PathBuf {
    let db_file = config
        .get_var("Sqlite", "db_file")
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_DB_FILE.to_string());
    let db_file = expand_home(&db_file);
    if db_file.is_absolute() {
        db_file
    } else {
        base_dir.join(db_file)
    }
}

fn copy_sample(path: &Path, out_dir: &Path) {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "sample".to_string());
    let target = out_dir.join(format!("{}.VIR", name));
    match std::fs::copy(path, &target) {
        Ok(_) => log::debug!("Copied sample to {}", target.display()),
        Err(e) => log::warn!("Could not copy sample to {}: {}", target.display(), e),
    }
}
