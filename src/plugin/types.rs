//! Type definitions for the plugin system

use crate::plugin::external::{ExternalManifest, ExternalPlugin};
use crate::plugin::traits::AnalysisPlugin;
use std::path::PathBuf;
use std::sync::Arc;
use strum_macros::{Display, EnumIter};

/// One of the three functions a runnable plugin provides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Capability {
    Activate,
    Deactivate,
    Analyze,
}

/// Declared capability set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub activate: bool,
    pub deactivate: bool,
    pub analyze: bool,
}

impl Capabilities {
    pub const ALL: Capabilities = Capabilities {
        activate: true,
        deactivate: true,
        analyze: true,
    };

    pub fn has(&self, capability: Capability) -> bool {
        match capability {
            Capability::Activate => self.activate,
            Capability::Deactivate => self.deactivate,
            Capability::Analyze => self.analyze,
        }
    }

    pub fn without(mut self, capability: Capability) -> Self {
        match capability {
            Capability::Activate => self.activate = false,
            Capability::Deactivate => self.deactivate = false,
            Capability::Analyze => self.analyze = false,
        }
        self
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::ALL
    }
}

/// Where a plugin's implementation comes from
#[derive(Clone)]
pub enum PluginSource {
    /// Compiled into filehound
    Builtin {
        factory: fn() -> Box<dyn AnalysisPlugin>,
    },
    /// Command described by a TOML manifest
    External {
        manifest: Arc<ExternalManifest>,
        manifest_path: PathBuf,
    },
}

impl std::fmt::Debug for PluginSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PluginSource::Builtin { .. } => write!(f, "Builtin"),
            PluginSource::External { manifest_path, .. } => f
                .debug_struct("External")
                .field("manifest_path", manifest_path)
                .finish(),
        }
    }
}

/// Metadata and constructor for one analysis plugin
#[derive(Debug, Clone)]
pub struct PluginDescriptor {
    pub name: String,
    pub category: String,
    pub prerequisite: Option<String>,
    pub description: String,
    pub capabilities: Capabilities,
    pub source: PluginSource,
}

impl PluginDescriptor {
    pub fn builtin(
        name: &str,
        category: &str,
        description: &str,
        factory: fn() -> Box<dyn AnalysisPlugin>,
    ) -> Self {
        Self {
            name: name.to_string(),
            category: category.to_string(),
            prerequisite: None,
            description: description.to_string(),
            capabilities: Capabilities::ALL,
            source: PluginSource::Builtin { factory },
        }
    }

    pub fn with_prerequisite(mut self, prerequisite: &str) -> Self {
        self.prerequisite = Some(prerequisite.to_string());
        self
    }

    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Human-readable origin for listings
    pub fn origin(&self) -> String {
        match &self.source {
            PluginSource::Builtin { .. } => "builtin".to_string(),
            PluginSource::External { manifest_path, .. } => manifest_path.display().to_string(),
        }
    }

    /// Fresh plugin instance for one file
    pub fn instantiate(&self) -> Box<dyn AnalysisPlugin> {
        match &self.source {
            PluginSource::Builtin { factory } => factory(),
            PluginSource::External { manifest, .. } => {
                Box::new(ExternalPlugin::new(Arc::clone(manifest)))
            }
        }
    }
}
