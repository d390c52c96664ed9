pub mod app;
pub mod classify;
pub mod core;
pub mod orchestrator;
pub mod output;
pub mod plugin;
pub mod queue;
pub mod results;
pub mod store;
