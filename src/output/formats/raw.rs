//! Raw output formatter

use crate::output::{write_file, OutputFormat, OutputFormatter, OutputResult};
use crate::results::Report;
use std::path::{Path, PathBuf};

pub const OUTPUT_FILE: &str = "output.raw";

/// Debug dump of the report, mainly for plugin development
pub struct RawFormatter;

impl OutputFormatter for RawFormatter {
    fn render(&self, report: &Report, out_dir: &Path) -> OutputResult<Vec<PathBuf>> {
        Ok(vec![write_file(
            out_dir.join(OUTPUT_FILE),
            &format!("{:#?}\n", report),
        )?])
    }

    fn format_type(&self) -> OutputFormat {
        OutputFormat::Raw
    }
}
