//! External plugin manifests
//!
//! An external plugin is a TOML file describing a command to run:
//!
//! ```toml
//! name = "PDF ID"
//! category = "PDF"
//! description = "Keyword counts from pdfid"
//! api_version = 20250727
//! command = "pdfid.py"
//! args = ["-e", "{file}"]
//! output_table = "pdfid"
//! ```

use crate::core::version::get_api_version;
use crate::plugin::error::{PluginError, PluginResult};
use serde::Deserialize;
use std::path::Path;

fn default_args() -> Vec<String> {
    vec!["{file}".to_string()]
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExternalManifest {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub prerequisite: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub api_version: Option<u32>,
    /// Program to run; without it the plugin cannot analyse anything
    #[serde(default)]
    pub command: Option<String>,
    /// Arguments with `{file}` and `{log_dir}` placeholders
    #[serde(default = "default_args")]
    pub args: Vec<String>,
    /// Title of the table holding the command output
    #[serde(default)]
    pub output_table: Option<String>,
}

impl ExternalManifest {
    pub fn from_toml_str(contents: &str, source: &str) -> PluginResult<Self> {
        let manifest: ExternalManifest =
            toml::from_str(contents).map_err(|e| PluginError::LoadError {
                plugin_name: source.to_string(),
                cause: e.to_string(),
            })?;

        if manifest.name.trim().is_empty() || manifest.category.trim().is_empty() {
            return Err(PluginError::LoadError {
                plugin_name: source.to_string(),
                cause: "manifest needs a non-empty name and category".to_string(),
            });
        }

        if let Some(required) = manifest.api_version {
            let host = get_api_version();
            if required > host {
                return Err(PluginError::VersionIncompatible {
                    message: format!(
                        "plugin '{}' needs API {} but this build provides {}",
                        manifest.name, required, host
                    ),
                });
            }
        }

        Ok(manifest)
    }

    pub fn load(path: &Path) -> PluginResult<Self> {
        let source = path.display().to_string();
        let contents = std::fs::read_to_string(path).map_err(|e| PluginError::LoadError {
            plugin_name: source.clone(),
            cause: e.to_string(),
        })?;
        Self::from_toml_str(&contents, &source)
    }

    /// Expand placeholders in the argument list
    pub fn render_args(&self, file: &Path, log_dir: &Path) -> Vec<String> {
        let file = file.display().to_string();
        let log_dir = log_dir.display().to_string();
        self.args
            .iter()
            .map(|arg| arg.replace("{file}", &file).replace("{log_dir}", &log_dir))
            .collect()
    }

    pub fn table_title(&self) -> &str {
        self.output_table
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or("Output")
    }
}
