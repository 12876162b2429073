//! Metrics for the harvest pipeline
//!
//! Recording goes through the `metrics` facade, so every call here is a
//! no-op until a recorder is installed with [`init`].

use std::fmt;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::info;

use crate::error::{Result, ScraperError};

/// Every metric name the pipeline records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Fetch
    FetchSuccess,
    FetchFailure,
    FetchRetry,
    FetchDuration,

    // Extraction
    ExtractStrategyUsed,
    ExtractFieldsExtracted,
    ExtractPageUnavailable,

    // Reconciliation
    ReconcileFieldSourced,

    // Normalization
    NormalizePhoneRejected,
    DedupDuplicateDiscarded,

    // Quality
    QualityScore,
    QualityBandAssigned,

    // Report
    ReportArtifactWritten,
    ReportArtifactWriteError,
    ReportRowsAppended,

    // Notifier
    NotifyFailure,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::FetchSuccess => "harvest_fetch_success_total",
            MetricName::FetchFailure => "harvest_fetch_failure_total",
            MetricName::FetchRetry => "harvest_fetch_retry_total",
            MetricName::FetchDuration => "harvest_fetch_duration_seconds",

            MetricName::ExtractStrategyUsed => "harvest_extract_strategy_used_total",
            MetricName::ExtractFieldsExtracted => "harvest_extract_fields_extracted",
            MetricName::ExtractPageUnavailable => "harvest_extract_page_unavailable_total",

            MetricName::ReconcileFieldSourced => "harvest_reconcile_field_sourced_total",

            MetricName::NormalizePhoneRejected => "harvest_normalize_phone_rejected_total",
            MetricName::DedupDuplicateDiscarded => "harvest_dedup_duplicate_discarded_total",

            MetricName::QualityScore => "harvest_quality_score",
            MetricName::QualityBandAssigned => "harvest_quality_band_total",

            MetricName::ReportArtifactWritten => "harvest_report_artifact_written_total",
            MetricName::ReportArtifactWriteError => "harvest_report_artifact_write_error_total",
            MetricName::ReportRowsAppended => "harvest_report_rows_appended_total",

            MetricName::NotifyFailure => "harvest_notify_failure_total",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn builder() -> PrometheusBuilder {
    PrometheusBuilder::new()
}

/// Install the Prometheus recorder and return the handle used to render snapshots
pub fn init() -> Result<PrometheusHandle> {
    let handle = builder()
        .install_recorder()
        .map_err(|e| ScraperError::Metrics(format!("Failed to install Prometheus recorder: {e}")))?;
    info!("Metrics recorder installed");
    Ok(handle)
}

pub mod fetch {
    use super::MetricName;

    pub fn success() {
        ::metrics::counter!(MetricName::FetchSuccess.as_str()).increment(1);
    }

    pub fn failure() {
        ::metrics::counter!(MetricName::FetchFailure.as_str()).increment(1);
    }

    pub fn retry() {
        ::metrics::counter!(MetricName::FetchRetry.as_str()).increment(1);
    }

    pub fn duration(secs: f64) {
        ::metrics::histogram!(MetricName::FetchDuration.as_str()).record(secs);
    }
}

pub mod extract {
    use super::MetricName;

    /// Page handled by a site-family strategy
    pub fn strategy_used(family: &'static str) {
        ::metrics::counter!(MetricName::ExtractStrategyUsed.as_str(), "family" => family).increment(1);
    }

    pub fn fields_extracted(count: u64) {
        ::metrics::histogram!(MetricName::ExtractFieldsExtracted.as_str()).record(count as f64);
    }

    pub fn page_unavailable() {
        ::metrics::counter!(MetricName::ExtractPageUnavailable.as_str()).increment(1);
    }
}

pub mod reconcile {
    use super::MetricName;

    pub fn field_sourced(field: &'static str, source: &'static str) {
        ::metrics::counter!(
            MetricName::ReconcileFieldSourced.as_str(),
            "field" => field,
            "source" => source
        )
        .increment(1);
    }
}

pub mod normalize {
    use super::MetricName;

    pub fn phone_rejected() {
        ::metrics::counter!(MetricName::NormalizePhoneRejected.as_str()).increment(1);
    }
}

pub mod dedup {
    use super::MetricName;

    pub fn duplicate_discarded() {
        ::metrics::counter!(MetricName::DedupDuplicateDiscarded.as_str()).increment(1);
    }
}

pub mod quality {
    use super::MetricName;

    pub fn score_recorded(score: f64) {
        ::metrics::histogram!(MetricName::QualityScore.as_str()).record(score);
    }

    pub fn band_assigned(band: &'static str) {
        ::metrics::counter!(MetricName::QualityBandAssigned.as_str(), "band" => band).increment(1);
    }
}

pub mod report {
    use super::MetricName;

    pub fn artifact_written(rows_appended: u64) {
        ::metrics::counter!(MetricName::ReportArtifactWritten.as_str()).increment(1);
        ::metrics::counter!(MetricName::ReportRowsAppended.as_str()).increment(rows_appended);
    }

    pub fn artifact_write_error() {
        ::metrics::counter!(MetricName::ReportArtifactWriteError.as_str()).increment(1);
    }
}

pub mod notify {
    use super::MetricName;

    pub fn failure() {
        ::metrics::counter!(MetricName::NotifyFailure.as_str()).increment(1);
    }
}
