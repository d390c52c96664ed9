//! A titled table of rows

use crate::results::error::{ResultError, ResultResult};
use crate::results::value::{Column, Value};
use serde::Serialize;

/// One row plus its position in the table
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TableRow {
    pub index: usize,
    pub values: Vec<Value>,
}

/// Header-checked table
///
/// The header is set exactly once. Every row must have one value per
/// header column; a rejected row leaves the table untouched.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResultTable {
    title: String,
    header: Option<Vec<Column>>,
    rows: Vec<TableRow>,
    vertical: bool,
    #[serde(skip)]
    next_index: usize,
}

impl ResultTable {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            header: None,
            rows: Vec::new(),
            vertical: false,
            next_index: 0,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn header(&self) -> Option<&[Column]> {
        self.header.as_deref()
    }

    /// Fix the column layout
    pub fn add_header(&mut self, columns: Vec<Column>) -> ResultResult<()> {
        if self.header.is_some() {
            return Err(ResultError::HeaderAlreadySet {
                table: self.title.clone(),
            });
        }
        if columns.is_empty() {
            return Err(ResultError::EmptyHeader {
                table: self.title.clone(),
            });
        }
        self.header = Some(columns);
        Ok(())
    }

    /// Append a row and return its index
    pub fn add_row<I, V>(&mut self, values: I) -> ResultResult<usize>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let header = self.header.as_ref().ok_or_else(|| ResultError::MissingHeader {
            table: self.title.clone(),
        })?;

        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        if values.len() != header.len() {
            return Err(ResultError::RowLengthMismatch {
                table: self.title.clone(),
                expected: header.len(),
                actual: values.len(),
            });
        }

        let index = self.next_index;
        self.next_index += 1;
        self.rows.push(TableRow { index, values });
        Ok(index)
    }

    /// Rows in index order
    pub fn rows(&self) -> impl Iterator<Item = &TableRow> {
        self.rows.iter()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render one `name: value` block per row instead of a grid
    pub fn set_vertical(&mut self, vertical: bool) {
        self.vertical = vertical;
    }

    pub fn is_vertical(&self) -> bool {
        self.vertical
    }
}
