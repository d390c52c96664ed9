//! JSON output formatter

use crate::output::{write_file, OutputFormat, OutputFormatter, OutputResult};
use crate::results::Report;
use std::path::{Path, PathBuf};

pub const OUTPUT_FILE: &str = "output.json";

/// Writes the whole report to `output.json`
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    pub fn new_compact() -> Self {
        Self { pretty: false }
    }

    pub fn to_json(&self, report: &Report) -> OutputResult<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(report)?
        } else {
            serde_json::to_string(report)?
        };
        Ok(json)
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for JsonFormatter {
    fn render(&self, report: &Report, out_dir: &Path) -> OutputResult<Vec<PathBuf>> {
        let json = self.to_json(report)?;
        Ok(vec![write_file(out_dir.join(OUTPUT_FILE), &json)?])
    }

    fn format_type(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::tests::page;

    #[test]
    fn test_report_shape() {
        let mut report = Report::new();
        report
            .entry("PDF".to_string())
            .or_default()
            .insert("PDF Meta".to_string(), page("Meta", &["v1.4"]));

        let json: serde_json::Value =
            serde_json::from_str(&JsonFormatter::new_compact().to_json(&report).unwrap()).unwrap();
        let table = &json["PDF"]["PDF Meta"]["tables"][0];
        assert_eq!(table["title"], "Meta");
        assert_eq!(table["header"][0]["name"], "Value");
        assert_eq!(table["rows"][0]["values"][0], "v1.4");
    }

    #[test]
    fn test_writes_output_json() {
        let dir = tempfile::tempdir().unwrap();
        let files = JsonFormatter::new().render(&Report::new(), dir.path()).unwrap();
        assert_eq!(files, vec![dir.path().join(OUTPUT_FILE)]);
        assert_eq!(std::fs::read_to_string(&files[0]).unwrap(), "{}");
    }
}
