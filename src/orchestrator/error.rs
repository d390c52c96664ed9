//! Error types for the orchestrator

use crate::core::error_handling::ContextualError;
use crate::queue::QueueError;
use crate::store::StoreError;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error("Could not create directory {}: {source}", path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not a file or directory", path.display())]
    InvalidInput { path: PathBuf },

    #[error("Could not read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Queue(#[from] QueueError),
}

impl ContextualError for OrchestratorError {
    fn is_user_actionable(&self) -> bool {
        matches!(
            self,
            OrchestratorError::Directory { .. }
                | OrchestratorError::InvalidInput { .. }
                | OrchestratorError::Read { .. }
        )
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            OrchestratorError::Directory { .. } => {
                Some("Check the permissions of the configured log directory")
            }
            OrchestratorError::InvalidInput { .. } => Some("Nothing to analyse"),
            OrchestratorError::Read { .. } => Some("The file could not be read"),
            _ => None,
        }
    }
}

pub type OrchestratorResult<T> = Result<T, OrchestratorError>;
