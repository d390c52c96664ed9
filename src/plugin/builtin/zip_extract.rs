//! ZIP Extract plugin
//!
//! Unpacks ZIP archives into `<log_dir>/zip_contents` with an external
//! command and lists the members. With `[ZIP Extract] feedback = true`
//! every extracted file is queued for its own analysis run.
//!
//! `unzip` exits with 1 when it only warned, for example after stripping
//! `../` from a member name. The members are on disk in that case, so the
//! run counts as a success.

use crate::plugin::context::AnalysisContext;
use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::traits::AnalysisPlugin;
use crate::plugin::types::PluginDescriptor;
use crate::queue::Job;
use crate::results::{Column, ColumnType, ResultPage, Value};
use std::path::{Path, PathBuf};
use tokio::process::Command;

pub const NAME: &str = "ZIP Extract";
pub const OUTPUT_DIR: &str = "zip_contents";

const DEFAULT_COMMAND: &str = "unzip";
const DEFAULT_ARGS: [&str; 4] = ["-o", "-d", "{out_dir}", "{file}"];
const PASSWORD_FLAG: &str = "-P";
// Info-ZIP: "one or more warning errors were encountered"
const WARNING_EXIT_CODE: i32 = 1;

crate::builtin!(descriptor);

fn descriptor() -> PluginDescriptor {
    PluginDescriptor::builtin(NAME, "ZIP", "Extract ZIP archive members", || {
        Box::new(ZipExtractPlugin::default())
    })
}

#[derive(Debug, Default)]
pub struct ZipExtractPlugin;

impl ZipExtractPlugin {
    /// Command and arguments with placeholders filled in
    ///
    /// `[ZIP Extract] password` is passed as `-P <password>` ahead of the
    /// configured arguments.
    fn command_line(ctx: &AnalysisContext<'_>, out_dir: &Path) -> (String, Vec<String>) {
        let command = ctx
            .config
            .get_var(NAME, "command")
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_COMMAND.to_string());
        let args = ctx
            .config
            .get_list(NAME, "args")
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| DEFAULT_ARGS.iter().map(|s| s.to_string()).collect());

        let file = ctx.path.display().to_string();
        let out_dir = out_dir.display().to_string();
        let mut rendered = Vec::with_capacity(args.len() + 2);
        if let Some(password) = ctx.config.get_var(NAME, "password").filter(|p| !p.is_empty()) {
            rendered.push(PASSWORD_FLAG.to_string());
            rendered.push(password);
        }
        rendered.extend(
            args.iter()
                .map(|arg| arg.replace("{file}", &file).replace("{out_dir}", &out_dir)),
        );
        (command, rendered)
    }
}

#[async_trait::async_trait]
impl AnalysisPlugin for ZipExtractPlugin {
    async fn analyze(&mut self, ctx: &AnalysisContext<'_>) -> PluginResult<Option<ResultPage>> {
        if !ctx.plugin_enabled(NAME) {
            log::debug!("{} disabled in configuration", NAME);
            return Ok(None);
        }

        let out_dir = ctx.log_dir.join(OUTPUT_DIR);
        tokio::fs::create_dir_all(&out_dir)
            .await
            .map_err(|e| PluginError::analysis(NAME, format!("{}: {}", out_dir.display(), e)))?;

        let (command, args) = Self::command_line(ctx, &out_dir);
        log::info!("Extracting {} with {}", ctx.path.display(), command);
        let output = Command::new(&command)
            .args(&args)
            .output()
            .await
            .map_err(|e| PluginError::analysis(NAME, format!("could not run {}: {}", command, e)))?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if output.status.code() == Some(WARNING_EXIT_CODE) {
            log::warn!("{} reported warnings for {}: {}", command, ctx.path.display(), stderr.trim());
        } else if !output.status.success() {
            return Err(PluginError::analysis(
                NAME,
                format!(
                    "{} exited with {}: {}",
                    command,
                    output.status,
                    stderr.trim()
                ),
            ));
        } else if !stderr.is_empty() {
            log::debug!("{}: {}", command, stderr.trim());
        }

        let members = extracted_files(&out_dir);
        let feedback = ctx.config.get_bvar(NAME, "feedback").unwrap_or(false);
        let sink = if feedback { ctx.feedback } else { None };
        if feedback && sink.is_none() {
            log::debug!("Feedback requested but no work queue is attached");
        }

        let mut page = ResultPage::new();
        page.set_filename("zip_extract");
        page.set_meta("out_dir", out_dir.display().to_string());
        let table = page
            .add_table(
                "ZIP Contents",
                Some(vec![
                    Column::text("File"),
                    Column::new("Size", ColumnType::Integer),
                    Column::new("Queued", ColumnType::Boolean),
                ]),
                None,
            )
            .map_err(|e| PluginError::analysis(NAME, e))?;

        for member in members {
            let size = std::fs::metadata(&member).map(|m| m.len()).unwrap_or(0);
            let queued = match sink {
                Some(sink) => match sink.submit(&Job::extracted(&member, &ctx.hashes.sha256)) {
                    Ok(_) => true,
                    Err(e) => {
                        log::warn!("Could not queue {}: {}", member.display(), e);
                        false
                    }
                },
                None => false,
            };
            let relative = member
                .strip_prefix(&out_dir)
                .unwrap_or(&member)
                .display()
                .to_string();
            table
                .add_row(vec![Value::from(relative), Value::from(size), Value::from(queued)])
                .map_err(|e| PluginError::analysis(NAME, e))?;
        }

        Ok(Some(page))
    }
}

/// Regular files below `dir`, sorted
fn extracted_files(dir: &Path) -> Vec<PathBuf> {
    let pattern = format!("{}/**/*", glob::Pattern::escape(&dir.display().to_string()));
    let mut files: Vec<PathBuf> = glob::glob(&pattern)
        .map(|paths| paths.filter_map(Result::ok).filter(|p| p.is_file()).collect())
        .unwrap_or_default();
    files.sort();
    files
}
