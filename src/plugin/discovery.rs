//! Plugin Discovery
//!
//! Builds the [`PluginRegistry`] for a run from two sources:
//!
//! 1. builtin plugins registered at compile time with `builtin!`, in name order
//! 2. external manifests (`*.toml`) found below each `[Dir] plugin_dir`
//!    entry, in path order
//!
//! A manifest that cannot be loaded, or whose name is already taken, is
//! recorded as a discovery failure and never registered. `[Plugins] exclude`
//! is applied last.

use crate::core::config::{expand_home, Config};
use crate::plugin::builtin::api::get_all_builtin_plugins;
use crate::plugin::error::PluginError;
use crate::plugin::external::{descriptor_for, ExternalManifest};
use crate::plugin::registry::PluginRegistry;
use crate::plugin::types::PluginDescriptor;
use std::path::{Path, PathBuf};

/// Discover every plugin the configuration points at
pub fn discover(config: &Config) -> PluginRegistry {
    let dirs: Vec<PathBuf> = config
        .get_list("Dir", "plugin_dir")
        .unwrap_or_default()
        .iter()
        .map(|d| expand_home(d))
        .collect();
    let excluded = config.get_list("Plugins", "exclude").unwrap_or_default();

    discover_with(get_all_builtin_plugins(), &dirs, &excluded)
}

/// Discovery with explicit inputs
pub fn discover_with(
    builtins: Vec<PluginDescriptor>,
    plugin_dirs: &[PathBuf],
    excluded: &[String],
) -> PluginRegistry {
    let mut registry = PluginRegistry::new();

    for descriptor in builtins {
        registry.register_or_record(descriptor);
    }

    for dir in plugin_dirs {
        if !dir.is_dir() {
            log::warn!("Plugin directory {} does not exist", dir.display());
            continue;
        }
        for manifest_path in find_manifests(dir) {
            match ExternalManifest::load(&manifest_path) {
                Ok(manifest) => {
                    registry.register_or_record(descriptor_for(manifest, &manifest_path));
                }
                Err(e) => {
                    log::warn!("Could not load plugin {}: {}", manifest_path.display(), e);
                    registry.record_failure(manifest_path.display().to_string(), e);
                }
            }
        }
    }

    registry.exclude(excluded);
    log::debug!(
        "Discovered {} plugins ({} failed)",
        registry.plugin_count(),
        registry.failures().len()
    );
    registry
}

/// Every `*.toml` below `dir`, sorted by path
fn find_manifests(dir: &Path) -> Vec<PathBuf> {
    let pattern = format!(
        "{}/**/*.toml",
        glob::Pattern::escape(&dir.display().to_string())
    );
    let mut found: Vec<PathBuf> = match glob::glob(&pattern) {
        Ok(paths) => paths
            .filter_map(|entry| match entry {
                Ok(path) => Some(path),
                Err(e) => {
                    log::debug!("Skipping unreadable plugin path: {}", e);
                    None
                }
            })
            .filter(|path| path.is_file())
            .collect(),
        Err(e) => {
            log::warn!("Invalid plugin directory pattern {}: {}", pattern, e);
            Vec::new()
        }
    };
    found.sort();
    found
}

/// Failures formatted for a listing
pub fn describe_failures(registry: &PluginRegistry) -> Vec<(String, String)> {
    registry
        .failures()
        .iter()
        .map(|f| {
            let kind = match f.error {
                PluginError::DuplicateName { .. } => "duplicate",
                PluginError::VersionIncompatible { .. } => "version",
                _ => "load",
            };
            (f.source.clone(), format!("{}: {}", kind, f.error))
        })
        .collect()
}
