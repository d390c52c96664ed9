//! API for builtin plugin registration and discovery
//!
//! Builtin plugins register themselves with the `builtin!` macro and are
//! collected at link time through `inventory`.

use crate::plugin::types::PluginDescriptor;

/// Entry for a builtin plugin in the link-time registry
pub struct BuiltinPluginEntry {
    pub descriptor: fn() -> PluginDescriptor,
}

inventory::collect!(BuiltinPluginEntry);

/// Register a builtin plugin descriptor for discovery
#[macro_export]
macro_rules! builtin {
    ($descriptor_fn:expr) => {
        inventory::submit!($crate::plugin::builtin::api::BuiltinPluginEntry {
            descriptor: $descriptor_fn
        });
    };
}

/// All registered builtin plugins, ordered by name
pub fn get_all_builtin_plugins() -> Vec<PluginDescriptor> {
    let mut plugins: Vec<PluginDescriptor> = inventory::iter::<BuiltinPluginEntry>()
        .map(|entry| (entry.descriptor)())
        .collect();
    plugins.sort_by(|a, b| a.name.cmp(&b.name));
    plugins
}
