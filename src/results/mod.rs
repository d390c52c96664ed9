//! Result Aggregation Model
//!
//! Every analysis plugin fills exactly one [`ResultPage`] per file. A page
//! holds titled [`ResultTable`]s; a table has a fixed header and rows that
//! are checked against it. Pages from one run are collected into an
//! immutable [`Report`] keyed by category and plugin name, which is all a
//! renderer ever sees.

pub mod error;
pub mod page;
pub mod table;
pub mod value;

pub use error::{ResultError, ResultResult};
pub use page::ResultPage;
pub use table::{ResultTable, TableRow};
pub use value::{text_columns, Column, ColumnType, Value};

use std::collections::BTreeMap;

/// Pages of one file: category name, then plugin name
pub type Report = BTreeMap<String, BTreeMap<String, ResultPage>>;
