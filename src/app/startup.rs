//! Application startup
//!
//! Order matters: arguments, then configuration (it decides where the log
//! file goes), then logging, then the orchestrator. Everything after logging
//! is reported through the `log` macros.

use crate::app::cli::args::{Args, ListKind};
use crate::app::cli::display::{category_table, plugin_table};
use crate::classify::Classifier;
use crate::core::config::Config;
use crate::core::error_handling::log_error_with_context;
use crate::core::logging::init_logging;
use crate::core::styles::palette_to_clap;
use crate::orchestrator::{base_dir, collect_files, AnalyzeOptions, Orchestrator};
use crate::plugin::api::discover;
use clap::{CommandFactory, FromArgMatches};
use std::io::IsTerminal;
use std::path::PathBuf;

pub const EXIT_OK: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;

const LOG_FILE_NAME: &str = "filehound.log";

/// Parse the process arguments and run; returns the exit code
pub async fn startup() -> i32 {
    let use_color = std::io::stdout().is_terminal();
    let matches = Args::command()
        .styles(palette_to_clap(use_color))
        .get_matches();
    let args = match Args::from_arg_matches(&matches) {
        Ok(args) => args,
        Err(e) => e.exit(),
    };
    run(args, use_color).await
}

pub async fn run(args: Args, use_color: bool) -> i32 {
    // overrides go in before logging so they can move the log file
    let mut override_errors = Vec::new();
    let loaded = Config::load(args.conf.as_deref()).map(|mut config| {
        for option in &args.options {
            if let Err(e) = config.apply_override(option) {
                override_errors.push(e);
            }
        }
        config
    });

    let config_verbose = loaded
        .as_ref()
        .ok()
        .and_then(|c| c.get_bvar("Misc", "verbose"))
        .unwrap_or(false);
    let log_file = log_file_for(&args, loaded.as_ref().ok());
    let level = args.log_level(config_verbose);
    if let Err(e) = init_logging(
        Some(&level),
        args.log_format.as_deref(),
        log_file.as_deref(),
        std::io::stderr().is_terminal(),
    ) {
        eprintln!("Could not initialise logging: {}", e);
    }

    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            log_error_with_context(&e, "Could not load configuration");
            return EXIT_FAILURE;
        }
    };
    for e in &override_errors {
        log::error!("{}", e);
    }
    for source in config.sources() {
        log::debug!("Read configuration from {}", source.display());
    }

    // SAFETY: geteuid has no preconditions and cannot fail
    if unsafe { libc::geteuid() } == 0 {
        log::warn!("You are running filehound as root. This may be dangerous.");
    }

    if let Some(kind) = args.list {
        match kind {
            ListKind::Analysis => print!("{}", plugin_table(&discover(&config), use_color)),
            ListKind::Cat => print!("{}", category_table(&Classifier::default(), use_color)),
        }
        return EXIT_OK;
    }

    let mut orchestrator = match Orchestrator::new(config) {
        Ok(orchestrator) => orchestrator,
        Err(e) => {
            log_error_with_context(&e, "Could not prepare the analysis environment");
            return EXIT_FAILURE;
        }
    };

    if args.clear_queue {
        return match orchestrator.clear_queue() {
            Ok(_) => EXIT_OK,
            Err(e) => {
                log_error_with_context(&e, "Could not clear the queue");
                EXIT_FAILURE
            }
        };
    }

    let Some(target) = args.target.as_deref() else {
        log::error!("No file or directory given. Use --help for usage.");
        return EXIT_FAILURE;
    };
    if !target.exists() {
        log::error!("{} does not exist", target.display());
        return EXIT_FAILURE;
    }

    let options = AnalyzeOptions {
        forced_category: args.category.clone(),
        single_plugin: args.plugin.clone(),
    };

    if args.ignore_queue {
        return analyze_directly(&orchestrator, target, &options).await;
    }

    if let Err(e) = orchestrator.enqueue_path(target) {
        log_error_with_context(&e, "Could not queue files");
        return EXIT_FAILURE;
    }
    match orchestrator.drain_queue(&options).await {
        Ok(summary) => {
            log::info!(
                "Analysis complete: {} files analysed, {} failed",
                summary.analyzed,
                summary.failed
            );
            EXIT_OK
        }
        Err(e) => {
            log_error_with_context(&e, "Could not read the work queue");
            EXIT_FAILURE
        }
    }
}

/// `--ignore-queue`: analyse now, in walk order
async fn analyze_directly(
    orchestrator: &Orchestrator,
    target: &std::path::Path,
    options: &AnalyzeOptions,
) -> i32 {
    let files = match collect_files(target) {
        Ok(files) => files,
        Err(e) => {
            log_error_with_context(&e, "Could not read the target");
            return EXIT_FAILURE;
        }
    };

    let mut failed = 0;
    for file in &files {
        match orchestrator.analyze_file(file, options).await {
            Ok(report) => log::info!("Results for {} in {}", file.display(), report.out_dir.display()),
            Err(e) => {
                log::error!("Analysis of {} failed: {}", file.display(), e);
                failed += 1;
            }
        }
    }
    if failed == files.len() && !files.is_empty() {
        EXIT_FAILURE
    } else {
        EXIT_OK
    }
}

/// `--log-file`, else `filehound.log` in the base directory if it exists
/// or can be created
fn log_file_for(args: &Args, config: Option<&Config>) -> Option<PathBuf> {
    if args.log_file_disabled() {
        return None;
    }
    if let Some(file) = &args.log_file {
        return Some(file.clone());
    }
    let dir = base_dir(config?);
    std::fs::create_dir_all(&dir).ok()?;
    Some(dir.join(LOG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn args(list: &[&str]) -> Args {
        let mut argv = vec!["filehound"];
        argv.extend_from_slice(list);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_log_file_defaults_to_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::defaults();
        config.set_var("Dir", "log_dir", dir.path().display().to_string());

        assert_eq!(
            log_file_for(&args(&[]), Some(&config)),
            Some(dir.path().join(LOG_FILE_NAME))
        );
        assert_eq!(
            log_file_for(&args(&["--log-file", "/tmp/x.log"]), Some(&config)),
            Some(PathBuf::from("/tmp/x.log"))
        );
        assert_eq!(log_file_for(&args(&["--log-file", "none"]), Some(&config)), None);
        assert_eq!(log_file_for(&args(&[]), None), None);
    }
}
