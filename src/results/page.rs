//! Pages of tables produced by one plugin

use crate::results::error::{ResultError, ResultResult};
use crate::results::table::ResultTable;
use crate::results::value::Column;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq, Serialize)]
struct PageEntry {
    index: i64,
    #[serde(skip)]
    seq: usize,
    #[serde(flatten)]
    table: ResultTable,
}

/// All output of one analysis plugin for one file
///
/// Tables are addressed by title and iterate ordered by their index. The
/// default index is the number of tables added so far; ties keep insertion
/// order.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ResultPage {
    tables: Vec<PageEntry>,
    meta: BTreeMap<String, String>,
    #[serde(skip)]
    counter: usize,
}

impl ResultPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table, optionally with its header and explicit sort index
    pub fn add_table(
        &mut self,
        title: &str,
        header: Option<Vec<Column>>,
        index: Option<i64>,
    ) -> ResultResult<&mut ResultTable> {
        if title.trim().is_empty() {
            return Err(ResultError::EmptyTitle);
        }
        if self.tables.iter().any(|e| e.table.title() == title) {
            return Err(ResultError::DuplicateTitle(title.to_string()));
        }

        let mut table = ResultTable::new(title);
        if let Some(columns) = header {
            table.add_header(columns)?;
        }

        let seq = self.counter;
        let index = index.unwrap_or(seq as i64);
        self.counter += 1;

        self.tables.push(PageEntry { index, seq, table });
        self.tables.sort_by_key(|e| (e.index, e.seq));

        let pos = self
            .tables
            .iter()
            .position(|e| e.seq == seq)
            .ok_or_else(|| ResultError::UnknownTable(title.to_string()))?;
        Ok(&mut self.tables[pos].table)
    }

    pub fn table(&self, title: &str) -> Option<&ResultTable> {
        self.tables
            .iter()
            .find(|e| e.table.title() == title)
            .map(|e| &e.table)
    }

    pub fn table_mut(&mut self, title: &str) -> ResultResult<&mut ResultTable> {
        self.tables
            .iter_mut()
            .find(|e| e.table.title() == title)
            .map(|e| &mut e.table)
            .ok_or_else(|| ResultError::UnknownTable(title.to_string()))
    }

    /// Tables ordered by index, with their index
    pub fn tables(&self) -> impl Iterator<Item = (i64, &ResultTable)> {
        self.tables.iter().map(|e| (e.index, &e.table))
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn meta(&self) -> &BTreeMap<String, String> {
        &self.meta
    }

    pub fn set_meta(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.meta.insert(key.into(), value.into());
    }

    /// File name used when each page gets its own output file
    pub fn filename(&self) -> Option<&str> {
        self.meta.get("filename").map(String::as_str)
    }

    pub fn set_filename(&mut self, filename: impl Into<String>) {
        self.set_meta("filename", filename);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::value::text_columns;

    fn titles(page: &ResultPage) -> Vec<String> {
        page.tables().map(|(_, t)| t.title().to_string()).collect()
    }

    #[test]
    fn test_explicit_indices_control_order() {
        let mut page = ResultPage::new();
        page.add_table("two", None, Some(2)).unwrap();
        page.add_table("zero", None, Some(0)).unwrap();
        page.add_table("one", None, Some(1)).unwrap();

        let indices: Vec<i64> = page.tables().map(|(i, _)| i).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(titles(&page), vec!["zero", "one", "two"]);
    }

    #[test]
    fn test_default_index_is_insertion_order() {
        let mut page = ResultPage::new();
        page.add_table("first", None, None).unwrap();
        page.add_table("second", None, None).unwrap();
        page.add_table("third", None, None).unwrap();
        assert_eq!(titles(&page), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_equal_indices_keep_insertion_order() {
        let mut page = ResultPage::new();
        page.add_table("b", None, Some(5)).unwrap();
        page.add_table("a", None, Some(5)).unwrap();
        page.add_table("c", None, Some(-1)).unwrap();
        assert_eq!(titles(&page), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_empty_and_duplicate_titles_fail() {
        let mut page = ResultPage::new();
        assert_eq!(page.add_table("", None, None).unwrap_err(), ResultError::EmptyTitle);
        assert_eq!(page.add_table("   ", None, None).unwrap_err(), ResultError::EmptyTitle);

        page.add_table("Hashes", None, None).unwrap();
        assert_eq!(
            page.add_table("Hashes", None, None).unwrap_err(),
            ResultError::DuplicateTitle("Hashes".to_string())
        );
        assert_eq!(page.len(), 1);
    }

    #[test]
    fn test_add_table_with_header_accepts_rows() {
        let mut page = ResultPage::new();
        let table = page
            .add_table("Hashes", Some(text_columns(["Algorithm", "Digest"])), None)
            .unwrap();
        table.add_row(["SHA1", "da39a3ee"]).unwrap();

        page.table_mut("Hashes")
            .unwrap()
            .add_row(["SHA256", "e3b0c442"])
            .unwrap();
        assert_eq!(page.table("Hashes").unwrap().row_count(), 2);
        assert!(matches!(
            page.table_mut("Missing"),
            Err(ResultError::UnknownTable(_))
        ));
    }

    #[test]
    fn test_empty_header_does_not_add_table() {
        let mut page = ResultPage::new();
        assert!(page.add_table("Broken", Some(Vec::new()), None).is_err());
        assert!(page.is_empty());
    }

    #[test]
    fn test_meta_filename() {
        let mut page = ResultPage::new();
        assert_eq!(page.filename(), None);
        page.set_filename("peinfo");
        assert_eq!(page.filename(), Some("peinfo"));
    }

    #[test]
    fn test_serializes_tables_in_order() {
        let mut page = ResultPage::new();
        page.add_table("late", Some(text_columns(["k"])), Some(9))
            .unwrap()
            .add_row(["v"])
            .unwrap();
        page.add_table("early", Some(text_columns(["k"])), Some(0)).unwrap();

        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["tables"][0]["title"], "early");
        assert_eq!(json["tables"][1]["title"], "late");
        assert_eq!(json["tables"][1]["index"], 9);
        assert_eq!(json["tables"][1]["rows"][0]["values"][0], "v");
        assert_eq!(json["tables"][1]["header"][0]["type"], "string");
    }
}
