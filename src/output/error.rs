//! Error types for output rendering

use crate::core::error_handling::ContextualError;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("Could not write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not serialize report: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unknown output format '{0}'")]
    UnknownFormat(String),
}

impl ContextualError for OutputError {
    fn is_user_actionable(&self) -> bool {
        matches!(self, OutputError::UnknownFormat(_))
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            OutputError::UnknownFormat(_) => Some("Valid output formats are text, json and raw"),
            _ => None,
        }
    }
}

pub type OutputResult<T> = Result<T, OutputError>;
