//! Plugin activation
//!
//! Decides which registered plugins run for one file and in what order.
//!
//! ```text
//! Pending ──validate──► Rejected
//!    │
//!    ▼
//! Validated ──no prereq──────────────────────► Activated
//!    │
//!    └──prereq──► AwaitingPrereq ──prereq ok──► Activated
//!                       │
//!                       └──no progress────────► Unsatisfiable
//! ```
//!
//! Plugins without a prerequisite activate in registry order. Deferred
//! plugins are then rescanned until a full pass activates nothing new. A
//! pass only ever adds to the activated list, so prerequisite cycles end
//! with every member unsatisfiable instead of looping.

use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::registry::{validate, PluginRegistry};
use crate::plugin::types::PluginDescriptor;
use std::collections::BTreeMap;
use std::fmt;

/// Per-run state of one plugin
#[derive(Debug, Clone, PartialEq)]
pub enum ActivationState {
    Pending,
    Validated,
    AwaitingPrereq,
    Activated,
    Rejected(String),
    Unsatisfiable,
}

/// Why a plugin did not make it into the activated list
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    Invalid(PluginError),
    ActivationFailed(PluginError),
    UnresolvedPrerequisite(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Invalid(e) => write!(f, "invalid: {}", e),
            SkipReason::ActivationFailed(e) => write!(f, "{}", e),
            SkipReason::UnresolvedPrerequisite(prereq) => {
                write!(f, "missing pre-req \"{}\"", prereq)
            }
        }
    }
}

/// A plugin selected to run
#[derive(Debug, Clone, PartialEq)]
pub struct ActivatedPlugin {
    pub category: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedPlugin {
    pub category: String,
    pub name: String,
    pub reason: SkipReason,
}

/// Outcome of activation for one file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivationReport {
    /// Invocation order; every plugin follows its prerequisite
    pub activated: Vec<ActivatedPlugin>,
    pub skipped: Vec<SkippedPlugin>,
    pub states: BTreeMap<String, ActivationState>,
}

impl ActivationReport {
    pub fn is_activated(&self, name: &str) -> bool {
        self.activated.iter().any(|a| a.name == name)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.activated.iter().position(|a| a.name == name)
    }

    pub fn state(&self, name: &str) -> Option<&ActivationState> {
        self.states.get(name)
    }

    fn set_state(&mut self, name: &str, state: ActivationState) {
        self.states.insert(name.to_string(), state);
    }

    fn skip(&mut self, category: &str, descriptor: &PluginDescriptor, reason: SkipReason) {
        self.skipped.push(SkippedPlugin {
            category: category.to_string(),
            name: descriptor.name.clone(),
            reason,
        });
    }
}

/// Resolve the activated list for `categories`
///
/// `single_plugin` limits the run to one plugin name. `try_activate` is
/// called once for every plugin at the moment it would join the activated
/// list; an error rejects that plugin and is recorded as skipped.
pub fn activate_plugins<F>(
    registry: &PluginRegistry,
    categories: &[String],
    single_plugin: Option<&str>,
    mut try_activate: F,
) -> ActivationReport
where
    F: FnMut(&str, &PluginDescriptor) -> PluginResult<()>,
{
    let mut report = ActivationReport::default();
    let mut deferred: Vec<(&str, &PluginDescriptor)> = Vec::new();

    for category in categories {
        log::debug!("Activating plugins for category {}.", category);

        for descriptor in registry.plugins_of_category(category) {
            if single_plugin.is_some_and(|only| only != descriptor.name) {
                continue;
            }
            if report.states.contains_key(&descriptor.name) {
                continue;
            }

            report.set_state(&descriptor.name, ActivationState::Pending);
            log::debug!("Validating plugin \"{}\"", descriptor.name);
            if let Err(e) = validate(descriptor) {
                log::debug!("Removing plugin {} {}: {}", descriptor.name, category, e);
                report.set_state(&descriptor.name, ActivationState::Rejected(e.to_string()));
                report.skip(category, descriptor, SkipReason::Invalid(e));
                continue;
            }
            report.set_state(&descriptor.name, ActivationState::Validated);

            if descriptor.prerequisite.is_some() {
                report.set_state(&descriptor.name, ActivationState::AwaitingPrereq);
                deferred.push((category.as_str(), descriptor));
            } else {
                activate_one(&mut report, category, descriptor, &mut try_activate);
            }
        }
    }

    // Fixed point over the deferred plugins
    let mut progressed = true;
    while progressed {
        progressed = false;
        let mut still_waiting = Vec::with_capacity(deferred.len());
        for (category, descriptor) in deferred {
            let prereq = descriptor.prerequisite.as_deref().unwrap_or_default();
            if report.is_activated(prereq) {
                log::debug!("Activating \"{}\". Pre-req fulfilled.", descriptor.name);
                activate_one(&mut report, category, descriptor, &mut try_activate);
                progressed = true;
            } else {
                still_waiting.push((category, descriptor));
            }
        }
        deferred = still_waiting;
    }

    for (category, descriptor) in deferred {
        let prereq = descriptor.prerequisite.clone().unwrap_or_default();
        log::debug!(
            "Plugin {} not activated due to missing pre-req \"{}\".",
            descriptor.name,
            prereq
        );
        report.set_state(&descriptor.name, ActivationState::Unsatisfiable);
        report.skip(category, descriptor, SkipReason::UnresolvedPrerequisite(prereq));
    }

    report
}

fn activate_one<F>(
    report: &mut ActivationReport,
    category: &str,
    descriptor: &PluginDescriptor,
    try_activate: &mut F,
) where
    F: FnMut(&str, &PluginDescriptor) -> PluginResult<()>,
{
    match try_activate(category, descriptor) {
        Ok(()) => {
            log::debug!("Activated \"{}\".", descriptor.name);
            report.set_state(&descriptor.name, ActivationState::Activated);
            report.activated.push(ActivatedPlugin {
                category: category.to_string(),
                name: descriptor.name.clone(),
            });
        }
        Err(e) => {
            log::info!("Plugin {} did not activate: {}", descriptor.name, e);
            report.set_state(&descriptor.name, ActivationState::Rejected(e.to_string()));
            report.skip(category, descriptor, SkipReason::ActivationFailed(e));
        }
    }
}
