//! Built-in Plugin Implementations
//!
//! Analysis plugins that ship with filehound. Each registers itself with
//! `builtin!` and is picked up by discovery.

pub mod api;
pub mod file_info;
pub mod zip_extract;
