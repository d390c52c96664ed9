//! Metadata store errors

use crate::core::error_handling::ContextualError;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Could not open metadata database {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Metadata database query failed: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("Metadata database lock was poisoned")]
    Poisoned,

    #[error("Sample {0} is not recorded")]
    UnknownSample(i64),
}

impl ContextualError for StoreError {
    fn is_user_actionable(&self) -> bool {
        matches!(self, StoreError::Open { .. })
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            StoreError::Open { .. } => {
                Some("The metadata database could not be opened; check [Sqlite] db_file")
            }
            _ => None,
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
