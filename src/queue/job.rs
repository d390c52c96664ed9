//! Job descriptors carried by the work queue

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A unit of queued work
///
/// Stored as tagged JSON so new job kinds can be added without breaking
/// rows written by older builds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Job {
    /// Analyse one file
    Analyze {
        path: PathBuf,
        /// SHA256 of the container this file was extracted from
        #[serde(default, skip_serializing_if = "Option::is_none")]
        origin: Option<String>,
    },
}

impl Job {
    pub fn analyze(path: impl Into<PathBuf>) -> Self {
        Job::Analyze {
            path: path.into(),
            origin: None,
        }
    }

    pub fn extracted(path: impl Into<PathBuf>, origin: impl Into<String>) -> Self {
        Job::Analyze {
            path: path.into(),
            origin: Some(origin.into()),
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Job::Analyze { path, .. } => path,
        }
    }
}
