//! Plugin Trait System
//!
//! Every analysis plugin implements [`AnalysisPlugin`]. One instance is
//! created per analysed file, activated, asked to analyse the file once and
//! deactivated again. The data flow is:
//!
//! ```text
//! Classifier → Activation → AnalysisPlugin::analyze → ResultPage → Renderers
//!                                   │
//!                                   └─(optional) new jobs → Work Queue
//! ```
//!
//! Plugins never see each other's pages and never control the queue beyond
//! appending jobs through the context.

use crate::plugin::context::AnalysisContext;
use crate::plugin::error::PluginResult;
use crate::results::ResultPage;

/// Interface every analysis plugin satisfies
#[async_trait::async_trait]
pub trait AnalysisPlugin: Send {
    /// Prepare for analysis; an error keeps the plugin out of this run
    fn activate(&mut self) -> PluginResult<()> {
        Ok(())
    }

    /// Release anything acquired in `activate`
    fn deactivate(&mut self) -> PluginResult<()> {
        Ok(())
    }

    /// Analyse `ctx.path`
    ///
    /// `Ok(None)` means the plugin declined (disabled, nothing to report).
    /// Errors are logged by the caller and never stop other plugins.
    async fn analyze(&mut self, ctx: &AnalysisContext<'_>) -> PluginResult<Option<ResultPage>>;
}
