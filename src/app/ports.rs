use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::path::Path;

use crate::domain::RawContent;
use crate::error::Result;
use crate::pipeline::report::Artifact;
use crate::pipeline::RunSummary;

/// Page retrieval. Failures come back as `RawContent::FetchFailed`, never as errors.
#[async_trait]
pub trait FetcherPort: Send + Sync {
    async fn fetch(&self, url: &str) -> RawContent;
}

/// Announces a freshly written artifact
#[async_trait]
pub trait NotifierPort: Send + Sync {
    async fn notify(&self, artifact_path: &Path, summary: &RunSummary) -> Result<()>;
}

/// Durable home of the report artifact
pub trait ArtifactStorePort: Send + Sync {
    fn location(&self) -> &Path;

    /// `None` when no artifact exists yet. An artifact that exists but cannot be
    /// read is an error, so it is never silently replaced.
    fn load(&self) -> Result<Option<Artifact>>;

    fn save(&self, artifact: &Artifact, generated_at: NaiveDateTime) -> Result<()>;
}
