//! Plugin Error Handling
//!
//! Error types for plugin discovery, validation, activation and analysis.
//! None of these end a run: the orchestrator turns them into skipped or
//! failed plugins and carries on.

use std::fmt;

/// Result type alias for plugin operations
pub type PluginResult<T> = std::result::Result<T, PluginError>;

/// Error types for plugin system operations
#[derive(Debug, Clone, PartialEq)]
pub enum PluginError {
    /// Plugin not found in registry
    PluginNotFound { plugin_name: String },

    /// Plugin manifest could not be read or parsed
    LoadError { plugin_name: String, cause: String },

    /// Plugin lacks one of activate, deactivate or analyze
    MissingCapability {
        plugin_name: String,
        capability: String,
    },

    /// Plugin API version newer than this build supports
    VersionIncompatible { message: String },

    /// A plugin with the same name is already registered
    DuplicateName { plugin_name: String },

    /// Plugin refused to activate
    ActivationFailed { plugin_name: String, cause: String },

    /// Plugin execution failed
    ExecutionError {
        plugin_name: String,
        operation: String,
        cause: String,
    },
}

impl fmt::Display for PluginError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PluginError::PluginNotFound { plugin_name } => {
                write!(f, "Plugin not found: {}", plugin_name)
            }
            PluginError::LoadError { plugin_name, cause } => {
                write!(f, "Failed to load plugin '{}': {}", plugin_name, cause)
            }
            PluginError::MissingCapability {
                plugin_name,
                capability,
            } => {
                write!(f, "Plugin '{}' is missing {} function", plugin_name, capability)
            }
            PluginError::VersionIncompatible { message } => {
                write!(f, "Version incompatible: {}", message)
            }
            PluginError::DuplicateName { plugin_name } => {
                write!(f, "Plugin '{}' is already registered", plugin_name)
            }
            PluginError::ActivationFailed { plugin_name, cause } => {
                write!(f, "Plugin '{}' failed to activate: {}", plugin_name, cause)
            }
            PluginError::ExecutionError {
                plugin_name,
                operation,
                cause,
            } => {
                write!(
                    f,
                    "Plugin '{}' failed during '{}': {}",
                    plugin_name, operation, cause
                )
            }
        }
    }
}

impl std::error::Error for PluginError {}

impl PluginError {
    /// Shorthand for a failure inside `analyze`
    pub fn analysis(plugin_name: &str, cause: impl fmt::Display) -> Self {
        PluginError::ExecutionError {
            plugin_name: plugin_name.to_string(),
            operation: "analyze".to_string(),
            cause: cause.to_string(),
        }
    }
}
