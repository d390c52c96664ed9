//! Plugin Registry
//!
//! Holds every discovered plugin descriptor in discovery order together with
//! the plugins that could not be loaded. Plugin names are unique across all
//! categories, so prerequisites can name any plugin.

use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::types::{Capability, PluginDescriptor};
use strum::IntoEnumIterator;

/// A plugin that was found but could not be registered
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryFailure {
    /// Plugin name or manifest path
    pub source: String,
    pub error: PluginError,
}

/// Registry of discovered analysis plugins
#[derive(Debug, Default)]
pub struct PluginRegistry {
    plugins: Vec<PluginDescriptor>,
    failures: Vec<DiscoveryFailure>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin; a second plugin with the same name is refused
    pub fn register(&mut self, descriptor: PluginDescriptor) -> PluginResult<()> {
        if self.has_plugin(&descriptor.name) {
            return Err(PluginError::DuplicateName {
                plugin_name: descriptor.name,
            });
        }
        log::debug!(
            "Registered plugin '{}' for category {}",
            descriptor.name,
            descriptor.category
        );
        self.plugins.push(descriptor);
        Ok(())
    }

    /// Register, recording a refusal as a discovery failure
    pub fn register_or_record(&mut self, descriptor: PluginDescriptor) {
        let source = descriptor.origin();
        if let Err(error) = self.register(descriptor) {
            log::warn!("Skipping plugin from {}: {}", source, error);
            self.record_failure(source, error);
        }
    }

    pub fn record_failure(&mut self, source: impl Into<String>, error: PluginError) {
        self.failures.push(DiscoveryFailure {
            source: source.into(),
            error,
        });
    }

    pub fn get_plugin(&self, name: &str) -> Option<&PluginDescriptor> {
        self.plugins.iter().find(|p| p.name == name)
    }

    pub fn has_plugin(&self, name: &str) -> bool {
        self.get_plugin(name).is_some()
    }

    /// Plugins of `category` in registration order; unknown categories
    /// simply have none
    pub fn plugins_of_category<'a>(
        &'a self,
        category: &'a str,
    ) -> impl Iterator<Item = &'a PluginDescriptor> + 'a {
        self.plugins.iter().filter(move |p| p.category == category)
    }

    pub fn all_plugins(&self) -> &[PluginDescriptor] {
        &self.plugins
    }

    pub fn failures(&self) -> &[DiscoveryFailure] {
        &self.failures
    }

    pub fn plugin_count(&self) -> usize {
        self.plugins.len()
    }

    /// Drop plugins whose names appear in `excluded`
    pub fn exclude(&mut self, excluded: &[String]) {
        self.plugins.retain(|p| {
            let keep = !excluded.iter().any(|e| e == &p.name);
            if !keep {
                log::debug!("Plugin '{}' excluded by configuration", p.name);
            }
            keep
        });
    }
}

/// Check that a plugin provides activate, deactivate and analyze
pub fn validate(descriptor: &PluginDescriptor) -> PluginResult<()> {
    for capability in Capability::iter() {
        if !descriptor.capabilities.has(capability) {
            return Err(PluginError::MissingCapability {
                plugin_name: descriptor.name.clone(),
                capability: capability.to_string(),
            });
        }
    }
    Ok(())
}

pub fn is_valid(descriptor: &PluginDescriptor) -> bool {
    validate(descriptor).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::tests::utils::{descriptor, MockBehaviour};
    use crate::plugin::types::Capabilities;

    #[test]
    fn test_duplicate_names_are_refused_across_categories() {
        let mut registry = PluginRegistry::new();
        registry
            .register(descriptor("Strings", "Generic", MockBehaviour::OneRow))
            .unwrap();
        let err = registry
            .register(descriptor("Strings", "EXE", MockBehaviour::OneRow))
            .unwrap_err();
        assert_eq!(
            err,
            PluginError::DuplicateName {
                plugin_name: "Strings".to_string()
            }
        );
        assert_eq!(registry.plugin_count(), 1);
    }

    #[test]
    fn test_register_or_record_keeps_failure() {
        let mut registry = PluginRegistry::new();
        registry.register_or_record(descriptor("Hex", "Generic", MockBehaviour::OneRow));
        registry.register_or_record(descriptor("Hex", "PDF", MockBehaviour::OneRow));
        assert_eq!(registry.plugin_count(), 1);
        assert_eq!(registry.failures().len(), 1);
        assert!(matches!(
            registry.failures()[0].error,
            PluginError::DuplicateName { .. }
        ));
    }

    #[test]
    fn test_plugins_of_category_keeps_order() {
        let mut registry = PluginRegistry::new();
        for (name, category) in [("b", "PDF"), ("x", "EXE"), ("a", "PDF")] {
            registry
                .register(descriptor(name, category, MockBehaviour::OneRow))
                .unwrap();
        }
        let names: Vec<&str> = registry
            .plugins_of_category("PDF")
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(registry.plugins_of_category("Unknown").count(), 0);
    }

    #[test]
    fn test_validate_reports_missing_capability() {
        let full = descriptor("Full", "Generic", MockBehaviour::OneRow);
        assert!(is_valid(&full));

        let partial = descriptor("Partial", "Generic", MockBehaviour::OneRow)
            .with_capabilities(Capabilities::ALL.without(Capability::Deactivate));
        assert_eq!(
            validate(&partial).unwrap_err(),
            PluginError::MissingCapability {
                plugin_name: "Partial".to_string(),
                capability: "deactivate".to_string(),
            }
        );
    }

    #[test]
    fn test_exclude_by_name() {
        let mut registry = PluginRegistry::new();
        registry
            .register(descriptor("Keep", "Generic", MockBehaviour::OneRow))
            .unwrap();
        registry
            .register(descriptor("Drop", "Generic", MockBehaviour::OneRow))
            .unwrap();
        registry.exclude(&["Drop".to_string()]);
        assert!(registry.has_plugin("Keep"));
        assert!(!registry.has_plugin("Drop"));
    }
}
