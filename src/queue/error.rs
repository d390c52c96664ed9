//! Queue Error Types

use crate::core::error_handling::ContextualError;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("Queue storage unavailable at {}: {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Could not create queue directory {}: {source}", path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not encode job payload: {0}")]
    Serialization(#[source] serde_json::Error),

    #[error("Job {id} has an unreadable payload and was dropped: {source}")]
    Corrupt {
        id: i64,
        #[source]
        source: serde_json::Error,
    },

    #[error("Queue handle lock was poisoned")]
    Poisoned,
}

impl ContextualError for QueueError {
    fn is_user_actionable(&self) -> bool {
        matches!(self, QueueError::Directory { .. })
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            QueueError::Directory { .. } => {
                Some("The queue directory could not be created; check permissions")
            }
            _ => None,
        }
    }
}

/// Result type for queue operations
pub type QueueResult<T> = Result<T, QueueError>;
