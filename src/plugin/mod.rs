//! Plugin System Module
//!
//! Analysis plugins are discovered once per process (builtins plus external
//! manifests), then for each file the activation engine picks the runnable
//! subset for the file's categories and the execution loop runs them in
//! order, collecting one result page per plugin.

pub mod activation;
pub mod builtin;
pub mod context;
pub mod discovery;
pub mod error;
pub mod execution;
pub mod external;
pub mod registry;
pub mod traits;
pub mod types;

// Public API module - the interface the orchestrator and binary use
pub mod api;

#[cfg(test)]
pub(crate) mod tests;
