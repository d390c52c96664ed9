//! Execution loop
//!
//! Runs activated plugin instances in order against one file. Each plugin
//! is isolated: an error or a panic inside `analyze` is recorded as a
//! failure for that plugin and the loop moves on.

use crate::plugin::context::AnalysisContext;
use crate::plugin::error::PluginError;
use crate::plugin::traits::AnalysisPlugin;
use crate::results::{Report, ResultPage};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::time::{Duration, Instant};

/// An activated plugin instance
pub struct ActivePlugin {
    pub category: String,
    pub name: String,
    pub instance: Box<dyn AnalysisPlugin>,
}

impl std::fmt::Debug for ActivePlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivePlugin")
            .field("category", &self.category)
            .field("name", &self.name)
            .finish()
    }
}

/// What one plugin produced
#[derive(Debug, Clone, PartialEq)]
pub enum PluginOutcome {
    Completed(ResultPage),
    Declined,
    Failed(PluginError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionRecord {
    pub category: String,
    pub name: String,
    pub outcome: PluginOutcome,
    pub elapsed: Duration,
}

/// Invoke `analyze` on every plugin in order
pub async fn run_plugins(
    plugins: &mut [ActivePlugin],
    ctx: &AnalysisContext<'_>,
) -> Vec<ExecutionRecord> {
    let mut records = Vec::with_capacity(plugins.len());

    for plugin in plugins.iter_mut() {
        log::debug!("Calling plugin \"{}\".", plugin.name);
        let started = Instant::now();

        let result = AssertUnwindSafe(plugin.instance.analyze(ctx))
            .catch_unwind()
            .await;

        let outcome = match result {
            Ok(Ok(Some(page))) => PluginOutcome::Completed(page),
            Ok(Ok(None)) => {
                log::debug!("Plugin \"{}\" returned no results.", plugin.name);
                PluginOutcome::Declined
            }
            Ok(Err(e)) => {
                log::info!("Plugin \"{}\" failed: {}", plugin.name, e);
                PluginOutcome::Failed(e)
            }
            Err(panic) => {
                let cause = panic_message(panic.as_ref());
                log::warn!("Plugin \"{}\" panicked: {}", plugin.name, cause);
                PluginOutcome::Failed(PluginError::analysis(&plugin.name, cause))
            }
        };

        records.push(ExecutionRecord {
            category: plugin.category.clone(),
            name: plugin.name.clone(),
            outcome,
            elapsed: started.elapsed(),
        });
    }

    records
}

/// Deactivate in reverse activation order; failures are only logged
pub fn deactivate_all(plugins: &mut [ActivePlugin]) {
    for plugin in plugins.iter_mut().rev() {
        if let Err(e) = plugin.instance.deactivate() {
            log::debug!("Plugin \"{}\" failed to deactivate: {}", plugin.name, e);
        }
    }
}

/// Group completed pages by category and plugin
pub fn collect_report(records: Vec<ExecutionRecord>) -> Report {
    let mut report = Report::new();
    for record in records {
        if let PluginOutcome::Completed(page) = record.outcome {
            report
                .entry(record.category)
                .or_default()
                .insert(record.name, page);
        }
    }
    report
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
