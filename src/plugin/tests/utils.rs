//! Plugin Test Utilities
//!
//! Mock plugins with fixed behaviour, usable anywhere a builtin factory is
//! expected.

use crate::plugin::context::AnalysisContext;
use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::traits::AnalysisPlugin;
use crate::plugin::types::PluginDescriptor;
use crate::results::{text_columns, ResultPage};
use std::sync::{Arc, Mutex};

pub const MOCK_TABLE: &str = "Mock";

/// What a mock plugin does when called
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehaviour {
    /// One table with one row holding the analysed path
    OneRow,
    /// Returns no page
    Decline,
    /// Returns an analysis error
    Fail,
    /// Panics inside `analyze`
    Panic,
    /// Refuses to activate
    FailActivate,
}

#[derive(Debug)]
pub struct MockPlugin {
    behaviour: MockBehaviour,
}

impl MockPlugin {
    pub fn new(behaviour: MockBehaviour) -> Self {
        Self { behaviour }
    }
}

#[async_trait::async_trait]
impl AnalysisPlugin for MockPlugin {
    fn activate(&mut self) -> PluginResult<()> {
        if self.behaviour == MockBehaviour::FailActivate {
            return Err(PluginError::ActivationFailed {
                plugin_name: "mock".to_string(),
                cause: "refused".to_string(),
            });
        }
        Ok(())
    }

    async fn analyze(&mut self, ctx: &AnalysisContext<'_>) -> PluginResult<Option<ResultPage>> {
        match self.behaviour {
            MockBehaviour::OneRow | MockBehaviour::FailActivate => {
                let mut page = ResultPage::new();
                page.add_table(MOCK_TABLE, Some(text_columns(["Path"])), None)
                    .and_then(|t| t.add_row([ctx.path.display().to_string()]))
                    .map_err(|e| PluginError::analysis("mock", e))?;
                Ok(Some(page))
            }
            MockBehaviour::Decline => Ok(None),
            MockBehaviour::Fail => Err(PluginError::analysis("mock", "mock failure")),
            MockBehaviour::Panic => panic!("mock plugin panicked"),
        }
    }
}

fn one_row() -> Box<dyn AnalysisPlugin> {
    Box::new(MockPlugin::new(MockBehaviour::OneRow))
}

fn decline() -> Box<dyn AnalysisPlugin> {
    Box::new(MockPlugin::new(MockBehaviour::Decline))
}

fn fail() -> Box<dyn AnalysisPlugin> {
    Box::new(MockPlugin::new(MockBehaviour::Fail))
}

fn panics() -> Box<dyn AnalysisPlugin> {
    Box::new(MockPlugin::new(MockBehaviour::Panic))
}

fn fail_activate() -> Box<dyn AnalysisPlugin> {
    Box::new(MockPlugin::new(MockBehaviour::FailActivate))
}

/// Builtin-style descriptor for a mock plugin
pub fn descriptor(name: &str, category: &str, behaviour: MockBehaviour) -> PluginDescriptor {
    let factory: fn() -> Box<dyn AnalysisPlugin> = match behaviour {
        MockBehaviour::OneRow => one_row,
        MockBehaviour::Decline => decline,
        MockBehaviour::Fail => fail,
        MockBehaviour::Panic => panics,
        MockBehaviour::FailActivate => fail_activate,
    };
    PluginDescriptor::builtin(name, category, "mock plugin", factory)
}

/// Plugin that appends its name to a shared log when deactivated
#[derive(Debug)]
pub struct RecordingPlugin {
    pub name: String,
    pub log: Arc<Mutex<Vec<String>>>,
}

#[async_trait::async_trait]
impl AnalysisPlugin for RecordingPlugin {
    fn deactivate(&mut self) -> PluginResult<()> {
        self.log.lock().unwrap().push(self.name.clone());
        Ok(())
    }

    async fn analyze(&mut self, _ctx: &AnalysisContext<'_>) -> PluginResult<Option<ResultPage>> {
        Ok(None)
    }
}
