//! Command-line arguments
//!
//! `filehound [OPTIONS] [FILE|DIR]`. Everything that is not a one-shot
//! action (`--list`, `--clear-queue`) ends up as a file or directory to
//! analyse, either through the work queue or directly with `--ignore-queue`.

use crate::core::logging::LOG_FORMATS;
use crate::core::version::long_version;
use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;

/// What `--list` prints
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListKind {
    /// Discovered analysis plugins
    Analysis,
    /// Registered file categories
    Cat,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "filehound")]
#[command(about = "Static analysis framework for suspicious files")]
#[command(version, long_version = long_version(), disable_version_flag = true)]
#[command(after_help = " * can be specified multiple times")]
pub struct Args {
    /// File or directory to analyse
    #[arg(value_name = "FILE|DIR")]
    pub target: Option<PathBuf>,

    /// Configuration file
    #[arg(short = 'c', long = "conf", value_name = "FILE")]
    pub conf: Option<PathBuf>,

    /// Remove every queued job and exit
    #[arg(long = "clear-queue")]
    pub clear_queue: bool,

    /// Analyse the target now without going through the queue
    #[arg(long = "ignore-queue")]
    pub ignore_queue: bool,

    /// List analysis plugins or file categories and exit
    #[arg(short = 'l', long = "list", value_name = "KIND")]
    pub list: Option<ListKind>,

    /// Override a configuration value*
    #[arg(short = 'o', long = "option", value_name = "SECTION.KEY=VALUE", action = ArgAction::Append)]
    pub options: Vec<String>,

    /// Run only this analysis plugin
    #[arg(short = 'p', long = "plugin", value_name = "NAME")]
    pub plugin: Option<String>,

    /// Force the file into this category
    #[arg(short = 't', long = "type", value_name = "CATEGORY")]
    pub category: Option<String>,

    /// Debug logging
    #[arg(short = 'V', long = "verbose", conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,

    /// Explicit log level, overrides --verbose and --quiet
    #[arg(long = "log-level", value_name = "LEVEL", value_parser = ["trace", "debug", "info", "warn", "error", "off"])]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(long = "log-format", value_name = "FORMAT", value_parser = LOG_FORMATS)]
    pub log_format: Option<String>,

    /// Log file path (use 'none' to disable file logging)
    #[arg(long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Print version
    #[arg(long = "version", action = ArgAction::Version)]
    pub version: Option<bool>,
}

impl Args {
    /// Log level from the explicit flag, then verbose/quiet
    pub fn log_level(&self, config_verbose: bool) -> String {
        if let Some(level) = &self.log_level {
            return level.clone();
        }
        crate::core::logging::level_for(self.verbose || (config_verbose && !self.quiet), self.quiet)
            .to_string()
    }

    /// `--log-file none` turns file logging off
    pub fn log_file_disabled(&self) -> bool {
        self.log_file
            .as_deref()
            .is_some_and(|p| p.as_os_str().eq_ignore_ascii_case("none"))
    }
}
