//! Format-specific renderer implementations

pub mod json;
pub mod raw;
pub mod text;

use crate::core::config::Config;
use crate::output::{OutputFormat, OutputFormatter};

/// Get the renderer for `format`
pub fn get_formatter(format: OutputFormat, config: &Config) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Text => Box::new(text::TextFormatter::from_config(config)),
        OutputFormat::Json => Box::new(json::JsonFormatter::new()),
        OutputFormat::Raw => Box::new(raw::RawFormatter),
    }
}
