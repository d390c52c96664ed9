//! Output Renderers
//!
//! Renderers turn the immutable per-file [`Report`] into files inside the
//! per-file output directory. Which renderers run is configured with
//! `[Output] formats`; a renderer that fails is logged and the others still
//! run.

pub mod error;
pub mod formats;

pub use error::{OutputError, OutputResult};
pub use formats::get_formatter;

use crate::core::config::Config;
use crate::plugin::builtin::file_info;
use crate::results::{Report, ResultPage};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum OutputFormat {
    /// Plain text tables
    Text,
    /// The whole report as JSON
    Json,
    /// Debug dump of the report
    Raw,
}

impl OutputFormat {
    pub fn names() -> impl Iterator<Item = String> {
        OutputFormat::iter().map(|f| f.to_string())
    }

    pub fn parse(name: &str) -> OutputResult<Self> {
        OutputFormat::from_str(name.trim()).map_err(|_| OutputError::UnknownFormat(name.to_string()))
    }

    /// Formats listed in `[Output] formats`; unknown names are skipped
    pub fn from_config(config: &Config) -> Vec<OutputFormat> {
        let mut formats = Vec::new();
        for name in config.get_list("Output", "formats").unwrap_or_default() {
            match OutputFormat::parse(&name) {
                Ok(format) if !formats.contains(&format) => formats.push(format),
                Ok(_) => {}
                Err(e) => log::warn!("{}", e),
            }
        }
        formats
    }
}

/// Renderer for one output format
pub trait OutputFormatter {
    /// Write `report` into `out_dir`, returning the files written
    fn render(&self, report: &Report, out_dir: &Path) -> OutputResult<Vec<PathBuf>>;

    fn format_type(&self) -> OutputFormat;
}

/// One plugin page with its place in the report
#[derive(Debug, Clone, Copy)]
pub struct PageRef<'a> {
    pub category: &'a str,
    pub plugin: &'a str,
    pub page: &'a ResultPage,
}

/// Pages in render order: File Information first, then by category and
/// plugin name
pub fn ordered_pages(report: &Report) -> Vec<PageRef<'_>> {
    let mut pages: Vec<PageRef<'_>> = report
        .iter()
        .flat_map(|(category, plugins)| {
            plugins.iter().map(move |(plugin, page)| PageRef {
                category,
                plugin,
                page,
            })
        })
        .collect();
    // stable sort keeps category/plugin order for everything else
    pages.sort_by_key(|p| p.plugin != file_info::NAME);
    pages
}

/// Run every configured renderer; failures are logged, not returned
pub fn render_all(report: &Report, out_dir: &Path, config: &Config) -> Vec<PathBuf> {
    let mut written = Vec::new();
    for format in OutputFormat::from_config(config) {
        let formatter = get_formatter(format, config);
        match formatter.render(report, out_dir) {
            Ok(files) => {
                for file in &files {
                    log::debug!("Wrote {} output to {}", format, file.display());
                }
                written.extend(files);
            }
            Err(e) => log::error!("Could not render {} output: {}", format, e),
        }
    }
    written
}

/// Write `contents` to `path`, mapping the error
pub(crate) fn write_file(path: PathBuf, contents: &str) -> OutputResult<PathBuf> {
    std::fs::write(&path, contents).map_err(|source| OutputError::Write {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}
