//! External command plugins
//!
//! Wraps a third-party tool described by an [`ExternalManifest`]. The tool's
//! standard output becomes a one-column table, one row per line.

pub mod manifest;

pub use manifest::ExternalManifest;

use crate::plugin::context::AnalysisContext;
use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::traits::AnalysisPlugin;
use crate::plugin::types::{Capabilities, Capability, PluginDescriptor, PluginSource};
use crate::results::{text_columns, ResultPage};
use std::path::Path;
use std::sync::Arc;
use tokio::process::Command;

/// Descriptor for a loaded manifest
///
/// A manifest without a command has no analyze capability and is rejected
/// when validated for a run.
pub fn descriptor_for(manifest: ExternalManifest, manifest_path: &Path) -> PluginDescriptor {
    let capabilities = if manifest.command.is_some() {
        Capabilities::ALL
    } else {
        Capabilities::ALL.without(Capability::Analyze)
    };
    PluginDescriptor {
        name: manifest.name.clone(),
        category: manifest.category.clone(),
        prerequisite: manifest.prerequisite.clone().filter(|p| !p.is_empty()),
        description: manifest.description.clone(),
        capabilities,
        source: PluginSource::External {
            manifest: Arc::new(manifest),
            manifest_path: manifest_path.to_path_buf(),
        },
    }
}

/// Runs the manifest command for one file
pub struct ExternalPlugin {
    manifest: Arc<ExternalManifest>,
}

impl ExternalPlugin {
    pub fn new(manifest: Arc<ExternalManifest>) -> Self {
        Self { manifest }
    }
}

#[async_trait::async_trait]
impl AnalysisPlugin for ExternalPlugin {
    async fn analyze(&mut self, ctx: &AnalysisContext<'_>) -> PluginResult<Option<ResultPage>> {
        let name = self.manifest.name.as_str();
        if !ctx.plugin_enabled(name) {
            log::debug!("Plugin \"{}\" disabled in configuration", name);
            return Ok(None);
        }

        let command = self.manifest.command.as_deref().ok_or_else(|| {
            PluginError::MissingCapability {
                plugin_name: name.to_string(),
                capability: Capability::Analyze.to_string(),
            }
        })?;
        let args = self.manifest.render_args(ctx.path, ctx.log_dir);
        log::info!("Running {} {}", command, args.join(" "));

        let output = Command::new(command)
            .args(&args)
            .current_dir(ctx.log_dir)
            .output()
            .await
            .map_err(|e| PluginError::analysis(name, format!("could not run {}: {}", command, e)))?;

        if !output.stderr.is_empty() {
            return Err(PluginError::analysis(
                name,
                String::from_utf8_lossy(&output.stderr).trim(),
            ));
        }
        if !output.status.success() {
            return Err(PluginError::analysis(
                name,
                format!("{} exited with {}", command, output.status),
            ));
        }

        let mut page = ResultPage::new();
        page.set_filename(name.replace(' ', "_").to_lowercase());
        let table = page
            .add_table(self.manifest.table_title(), Some(text_columns(["Output"])), None)
            .map_err(|e| PluginError::analysis(name, e))?;
        for line in String::from_utf8_lossy(&output.stdout).lines() {
            table
                .add_row([line.to_string()])
                .map_err(|e| PluginError::analysis(name, e))?;
        }

        Ok(Some(page))
    }
}
