use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn, Instrument};
use uuid::Uuid;

use crate::app::ports::{ArtifactStorePort, FetcherPort, NotifierPort};
use crate::constants::RUN_TIMESTAMP_FORMAT;
use crate::domain::{RawContent, TargetDescriptor};
use crate::error::Result;
use crate::observability::metrics;
use crate::pipeline::processing::dedup::Deduplicator;
use crate::pipeline::processing::extract::{ExtractedRecord, ExtractionRegistry};
use crate::pipeline::processing::normalize::{CleanRecord, Normalizer};
use crate::pipeline::processing::quality_gate::BandCounts;
use crate::pipeline::processing::reconcile::reconcile;
use crate::pipeline::report::Report;

/// The pure per-target pipeline: extract, reconcile, normalize, score
#[derive(Default)]
pub struct Pipeline {
    registry: ExtractionRegistry,
    normalizer: Normalizer,
}

impl Pipeline {
    pub fn new(registry: ExtractionRegistry, normalizer: Normalizer) -> Self {
        Self {
            registry,
            normalizer,
        }
    }

    pub fn registry(&self) -> &ExtractionRegistry {
        &self.registry
    }

    pub fn process_target(&self, target: &TargetDescriptor, raw: &RawContent) -> CleanRecord {
        let extracted = self.registry.extract(target, raw);
        self.complete(target, &extracted)
    }

    /// Reconcile and normalize an extraction that has already run
    pub fn complete(&self, target: &TargetDescriptor, extracted: &ExtractedRecord) -> CleanRecord {
        let reconciled = reconcile(target, extracted);
        let clean = self.normalizer.normalize(reconciled);
        debug!(
            target_name = %target.name,
            score = %clean.quality_score,
            sources = %clean.fields.source_tags(),
            "target processed"
        );
        clean
    }

    /// Process targets in order and collapse duplicates.
    /// Returns the kept records and how many duplicates were dropped.
    pub fn build_records(
        &self,
        targets: &[TargetDescriptor],
        pages: &[RawContent],
    ) -> (Vec<CleanRecord>, usize) {
        let mut deduplicator = Deduplicator::new();
        for (target, raw) in targets.iter().zip(pages) {
            deduplicator.offer(self.process_target(target, raw));
        }
        let discarded = deduplicator.discarded();
        (deduplicator.finish(), discarded)
    }
}

/// Fetch every target with at most `concurrency` requests in flight.
/// Results come back in target order whatever order the fetches finish in.
pub async fn fetch_all(
    fetcher: Arc<dyn FetcherPort>,
    targets: &[TargetDescriptor],
    concurrency: usize,
) -> Vec<RawContent> {
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut tasks = JoinSet::new();

    for (index, target) in targets.iter().enumerate() {
        let fetcher = Arc::clone(&fetcher);
        let semaphore = Arc::clone(&semaphore);
        let url = target.url.clone();
        tasks.spawn(
            async move {
                let _permit = semaphore.acquire_owned().await;
                (index, fetcher.fetch(&url).await)
            }
            .in_current_span(),
        );
    }

    let mut pages = vec![RawContent::failed("fetch task did not complete"); targets.len()];
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, content)) => pages[index] = content,
            Err(e) => warn!(error = %e, "fetch task aborted"),
        }
    }
    pages
}

/// What one run did
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub run_timestamp: String,
    pub targets: usize,
    pub pages_fetched: usize,
    pub fetch_failures: usize,
    pub records_kept: usize,
    pub duplicates_removed: usize,
    pub average_score: f64,
    pub bands: BandCounts,
    pub artifact_path: Option<PathBuf>,
    pub artifact_rows: usize,
    pub dry_run: bool,
}

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub summary: RunSummary,
    pub report: Report,
}

/// Drives one full run: fetch, process, render, persist, notify
pub struct Harvester {
    pipeline: Pipeline,
    fetcher: Arc<dyn FetcherPort>,
    store: Arc<dyn ArtifactStorePort>,
    notifier: Arc<dyn NotifierPort>,
    concurrency: usize,
}

impl Harvester {
    pub fn new(
        pipeline: Pipeline,
        fetcher: Arc<dyn FetcherPort>,
        store: Arc<dyn ArtifactStorePort>,
        notifier: Arc<dyn NotifierPort>,
        concurrency: usize,
    ) -> Self {
        Self {
            pipeline,
            fetcher,
            store,
            notifier,
            concurrency,
        }
    }

    /// Run once. Only a persistence failure aborts; fetch and notify failures degrade.
    pub async fn run(&self, targets: &[TargetDescriptor], dry_run: bool) -> Result<RunOutcome> {
        let run_id = Uuid::new_v4();
        let run_timestamp = Local::now().naive_local();
        let span = tracing::info_span!("harvest_run", %run_id);
        self.run_with(run_id, run_timestamp, targets, dry_run)
            .instrument(span)
            .await
    }

    #[instrument(skip(self, targets), fields(targets = targets.len()))]
    pub async fn run_with(
        &self,
        run_id: Uuid,
        run_timestamp: NaiveDateTime,
        targets: &[TargetDescriptor],
        dry_run: bool,
    ) -> Result<RunOutcome> {
        let started = Instant::now();
        info!("Starting harvest of {} targets", targets.len());

        let pages = fetch_all(Arc::clone(&self.fetcher), targets, self.concurrency).await;
        let fetch_failures = pages.iter().filter(|p| p.is_failure()).count();
        info!(
            pages = pages.len() - fetch_failures,
            failures = fetch_failures,
            "fetch phase complete"
        );

        let (records, duplicates_removed) = self.pipeline.build_records(targets, &pages);
        let report = Report::new(run_id, run_timestamp, records);
        let assessment = report.assessment();
        assessment.log();

        let mut summary = RunSummary {
            run_id,
            run_timestamp: run_timestamp.format(RUN_TIMESTAMP_FORMAT).to_string(),
            targets: targets.len(),
            pages_fetched: pages.len() - fetch_failures,
            fetch_failures,
            records_kept: report.records.len(),
            duplicates_removed,
            average_score: assessment.average,
            bands: assessment.bands,
            artifact_path: None,
            artifact_rows: 0,
            dry_run,
        };

        if dry_run {
            info!(records = summary.records_kept, "dry run; artifact not written");
            return Ok(RunOutcome { summary, report });
        }

        let artifact = match self
            .store
            .load()
            .and_then(|existing| {
                let artifact = report.render_onto(existing);
                self.store.save(&artifact, run_timestamp)?;
                Ok(artifact)
            }) {
            Ok(artifact) => artifact,
            Err(e) => {
                metrics::report::artifact_write_error();
                return Err(e);
            }
        };
        metrics::report::artifact_written(report.records.len() as u64);

        let path = self.store.location().to_path_buf();
        summary.artifact_path = Some(path.clone());
        summary.artifact_rows = artifact.len();

        if let Err(e) = self.notifier.notify(&path, &summary).await {
            metrics::notify::failure();
            warn!(error = %e, "notification failed; the artifact is still in place");
        }

        info!(
            records = summary.records_kept,
            duplicates = summary.duplicates_removed,
            artifact_rows = summary.artifact_rows,
            elapsed_secs = started.elapsed().as_secs_f64(),
            "harvest complete"
        );
        Ok(RunOutcome { summary, report })
    }
}
