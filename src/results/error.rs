//! Result model errors

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResultError {
    #[error("Table '{table}' needs a header before rows can be added")]
    MissingHeader { table: String },

    #[error("Table '{table}' already has a header")]
    HeaderAlreadySet { table: String },

    #[error("Table '{table}' header must name at least one column")]
    EmptyHeader { table: String },

    #[error("Row length ({actual}) does not equal header length ({expected}) in table '{table}'")]
    RowLengthMismatch {
        table: String,
        expected: usize,
        actual: usize,
    },

    #[error("New tables must have a title")]
    EmptyTitle,

    #[error("Table '{0}' already exists on this page")]
    DuplicateTitle(String),

    #[error("Table '{0}' does not exist")]
    UnknownTable(String),
}

pub type ResultResult<T> = Result<T, ResultError>;
