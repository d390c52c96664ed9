//! File Information plugin
//!
//! Basic facts about every sample: name, size, digests and when it was
//! analysed. When a metadata store is available the sighting is recorded
//! and the first/last seen times are reported as well.

use crate::plugin::context::AnalysisContext;
use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::traits::AnalysisPlugin;
use crate::plugin::types::PluginDescriptor;
use crate::results::{text_columns, Column, ColumnType, ResultPage, Value};
use chrono::{DateTime, Utc};

pub const NAME: &str = "File Information";

crate::builtin!(descriptor);

fn descriptor() -> PluginDescriptor {
    PluginDescriptor::builtin(
        NAME,
        crate::classify::GENERIC,
        "Basic file information and digests",
        || Box::new(FileInfoPlugin::default()),
    )
}

#[derive(Debug, Default)]
pub struct FileInfoPlugin;

#[async_trait::async_trait]
impl AnalysisPlugin for FileInfoPlugin {
    async fn analyze(&mut self, ctx: &AnalysisContext<'_>) -> PluginResult<Option<ResultPage>> {
        if !ctx.plugin_enabled(NAME) {
            log::debug!("{} disabled in configuration", NAME);
            return Ok(None);
        }

        let metadata = tokio::fs::metadata(ctx.path)
            .await
            .map_err(|e| PluginError::analysis(NAME, e))?;
        let size = metadata.len();
        let analyzed = Utc::now();
        let file_name = ctx
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| ctx.path.display().to_string());

        let mut columns = vec![
            Column::text("File Name"),
            Column::new("Size", ColumnType::Integer),
            Column::new("Time Analyzed", ColumnType::Timestamp),
        ];
        let mut values: Vec<Value> = vec![file_name.into(), size.into(), analyzed.into()];

        if let (Some(store), Some(sample_id)) = (ctx.store, ctx.sample_id) {
            let path = ctx.path.display().to_string();
            match store.record_file_seen(sample_id, &path, size, analyzed) {
                Ok(record) => {
                    columns.push(Column::new("First Seen", ColumnType::Timestamp));
                    columns.push(Column::new("Last Seen", ColumnType::Timestamp));
                    columns.push(Column::new("Times Seen", ColumnType::Integer));
                    values.push(from_epoch(record.first_seen));
                    values.push(from_epoch(record.last_seen));
                    values.push(record.times.into());
                }
                Err(e) => log::warn!("Could not record {} in the metadata store: {}", path, e),
            }
        }

        let mut page = ResultPage::new();
        page.set_filename("file_info");

        let info = page
            .add_table(NAME, Some(columns), Some(0))
            .map_err(|e| PluginError::analysis(NAME, e))?;
        info.set_vertical(true);
        info.add_row(values)
            .map_err(|e| PluginError::analysis(NAME, e))?;

        let hashes = page
            .add_table("File Hashes", Some(text_columns(["MD5", "SHA1", "SHA256"])), Some(1))
            .map_err(|e| PluginError::analysis(NAME, e))?;
        hashes.set_vertical(true);
        hashes
            .add_row([
                ctx.hashes.md5.as_str(),
                ctx.hashes.sha1.as_str(),
                ctx.hashes.sha256.as_str(),
            ])
            .map_err(|e| PluginError::analysis(NAME, e))?;

        Ok(Some(page))
    }
}

fn from_epoch(seconds: i64) -> Value {
    DateTime::<Utc>::from_timestamp(seconds, 0).into()
}
