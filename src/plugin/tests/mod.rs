//! Test modules for the plugin system
//!
//! Activation ordering and execution isolation suites, plus the mock
//! plugins shared with the unit tests next to the code.

pub(crate) mod utils;
