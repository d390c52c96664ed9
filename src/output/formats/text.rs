//! Text output formatter
//!
//! Tables are drawn with `prettytable`. Vertical tables print one
//! `name: value` block per row instead of a single wide grid.

use crate::core::config::Config;
use crate::output::{ordered_pages, write_file, OutputFormat, OutputFormatter, OutputResult, PageRef};
use crate::results::{Report, ResultTable};
use prettytable::{format, Cell, Row, Table};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const SINGLE_FILE: &str = "output.txt";

/// Where text output goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextLayout {
    /// Every page in `output.txt`
    Single,
    /// One file per page, named after the page's filename
    Multiple,
}

impl TextLayout {
    pub fn from_config(config: &Config) -> Self {
        match config.get_var("Output", "text_format").as_deref() {
            Some("multiple") => TextLayout::Multiple,
            Some("single") | None => TextLayout::Single,
            Some(other) => {
                log::warn!("Unknown text_format '{}', using single", other);
                TextLayout::Single
            }
        }
    }
}

pub struct TextFormatter {
    layout: TextLayout,
}

impl TextFormatter {
    pub fn new(layout: TextLayout) -> Self {
        Self { layout }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(TextLayout::from_config(config))
    }

    /// Render one table as text
    pub fn format_table(table: &ResultTable) -> String {
        let mut out = format!("{}\n", table.title());
        let Some(header) = table.header() else {
            return out;
        };
        if table.is_empty() {
            out.push_str("(no rows)\n");
            return out;
        }

        if table.is_vertical() {
            for row in table.rows() {
                let mut block = Table::new();
                block.set_format(*format::consts::FORMAT_CLEAN);
                for (column, value) in header.iter().zip(&row.values) {
                    block.add_row(Row::new(vec![
                        Cell::new(&format!("{}:", column.name)),
                        Cell::new(&value.to_string()),
                    ]));
                }
                out.push_str(&block.to_string());
                out.push('\n');
            }
        } else {
            let mut grid = Table::new();
            grid.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
            grid.set_titles(Row::new(
                header.iter().map(|c| Cell::new(&c.name)).collect(),
            ));
            for row in table.rows() {
                grid.add_row(Row::new(
                    row.values
                        .iter()
                        .map(|v| Cell::new(&v.to_string()))
                        .collect(),
                ));
            }
            out.push_str(&grid.to_string());
        }
        out
    }

    /// Render one plugin page with a banner
    pub fn format_page(page: &PageRef<'_>) -> String {
        let banner = format!("{} ({})", page.plugin, page.category);
        let mut out = format!("{}\n{}\n", banner, "=".repeat(banner.len()));
        for (_, table) in page.page.tables() {
            out.push_str(&Self::format_table(table));
            out.push('\n');
        }
        out
    }

    fn page_file_name(page: &PageRef<'_>) -> String {
        let stem: String = page
            .page
            .filename()
            .unwrap_or(page.plugin)
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        format!("{}.txt", stem)
    }
}

impl OutputFormatter for TextFormatter {
    fn render(&self, report: &Report, out_dir: &Path) -> OutputResult<Vec<PathBuf>> {
        let pages = ordered_pages(report);
        match self.layout {
            TextLayout::Single => {
                let text: String = pages.iter().map(Self::format_page).collect();
                Ok(vec![write_file(out_dir.join(SINGLE_FILE), &text)?])
            }
            TextLayout::Multiple => {
                // pages sharing a filename end up in the same file
                let mut files: BTreeMap<String, String> = BTreeMap::new();
                for page in &pages {
                    files
                        .entry(Self::page_file_name(page))
                        .or_default()
                        .push_str(&Self::format_page(page));
                }
                files
                    .into_iter()
                    .map(|(name, text)| write_file(out_dir.join(name), &text))
                    .collect()
            }
        }
    }

    fn format_type(&self) -> OutputFormat {
        OutputFormat::Text
    }
}
