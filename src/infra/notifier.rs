use async_trait::async_trait;
use std::path::Path;
use tracing::info;

use crate::app::ports::NotifierPort;
use crate::error::Result;
use crate::pipeline::RunSummary;

/// Announces the artifact through the log
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl NotifierPort for LogNotifier {
    async fn notify(&self, artifact_path: &Path, summary: &RunSummary) -> Result<()> {
        info!(
            path = %artifact_path.display(),
            run_id = %summary.run_id,
            records = summary.records_kept,
            artifact_rows = summary.artifact_rows,
            high = summary.bands.high,
            medium = summary.bands.medium,
            low = summary.bands.low,
            "Report ready: {} new records, {} rows total",
            summary.records_kept,
            summary.artifact_rows
        );
        Ok(())
    }
}
