//! Public API for the plugin system
//!
//! External modules should import from here rather than from the internal
//! modules directly.

// Discovery and the registry it produces
pub use crate::plugin::discovery::{describe_failures, discover, discover_with};
pub use crate::plugin::registry::{is_valid, validate, DiscoveryFailure, PluginRegistry};

// Plugin metadata
pub use crate::plugin::types::{Capabilities, Capability, PluginDescriptor, PluginSource};

// Activation and execution
pub use crate::plugin::activation::{
    activate_plugins, ActivatedPlugin, ActivationReport, ActivationState, SkipReason,
    SkippedPlugin,
};
pub use crate::plugin::execution::{
    collect_report, deactivate_all, run_plugins, ActivePlugin, ExecutionRecord, PluginOutcome,
};

// Writing plugins
pub use crate::plugin::context::{AnalysisContext, JobSink};
pub use crate::plugin::error::{PluginError, PluginResult};
pub use crate::plugin::external::{ExternalManifest, ExternalPlugin};
pub use crate::plugin::traits::AnalysisPlugin;
