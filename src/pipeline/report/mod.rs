use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use uuid::Uuid;

use crate::constants::{MAX_CELL_CHARS, RUN_TIMESTAMP_FORMAT, UNKNOWN};
use crate::pipeline::processing::normalize::CleanRecord;
use crate::pipeline::processing::quality_gate::{BatchAssessment, QualityBand};

pub mod xlsx;

pub use xlsx::XlsxArtifactStore;

/// One artifact row, in column order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub name: String,
    pub location: String,
    pub project_type: String,
    pub contact_name: String,
    pub mobile_number: String,
    pub quality_score: f64,
    pub source_tags: String,
    pub run_timestamp: String,
}

/// Text cut down to what a single spreadsheet cell accepts
fn cell_text(value: &str) -> String {
    match value.char_indices().nth(MAX_CELL_CHARS) {
        Some((end, _)) => value[..end].to_string(),
        None => value.to_string(),
    }
}

impl ReportRow {
    pub fn from_record(record: &CleanRecord, run_timestamp: &str) -> Self {
        let fields = &record.fields;
        Self {
            name: cell_text(&fields.name.value),
            location: cell_text(&fields.location.value),
            project_type: cell_text(&fields.project_type.value),
            contact_name: cell_text(&fields.contact_name.value),
            mobile_number: cell_text(&fields.mobile_number.value),
            quality_score: record.quality_score.value(),
            source_tags: fields.source_tags(),
            run_timestamp: run_timestamp.to_string(),
        }
    }

    pub fn band(&self) -> QualityBand {
        QualityBand::from_score(self.quality_score)
    }
}

/// The full tabular artifact: every row from every run so far
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Artifact {
    pub rows: Vec<ReportRow>,
}

impl Artifact {
    pub fn new(rows: Vec<ReportRow>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct run timestamps present in the artifact
    pub fn runs_recorded(&self) -> usize {
        self.rows
            .iter()
            .map(|r| r.run_timestamp.as_str())
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Summary statistics shown on the metadata sheet
    pub fn summary(&self) -> ArtifactSummary {
        ArtifactSummary {
            total_records: self.len(),
            runs_recorded: self.runs_recorded(),
            assessment: BatchAssessment::from_scores(self.rows.iter().map(|r| r.quality_score)),
            project_types: distribution(self.rows.iter().map(|r| r.project_type.as_str())),
            locations: distribution(self.rows.iter().map(|r| r.location.as_str())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtifactSummary {
    pub total_records: usize,
    pub runs_recorded: usize,
    pub assessment: BatchAssessment,
    pub project_types: Vec<(String, usize)>,
    pub locations: Vec<(String, usize)>,
}

/// Value counts, most frequent first; `Unknown` is counted but listed last
fn distribution<'a>(values: impl Iterator<Item = &'a str>) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in values {
        *counts.entry(value).or_default() += 1;
    }
    let mut sorted: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(value, count)| (value.to_string(), count))
        .collect();
    sorted.sort_by(|a, b| {
        (a.0 == UNKNOWN)
            .cmp(&(b.0 == UNKNOWN))
            .then(b.1.cmp(&a.1))
            .then(a.0.cmp(&b.0))
    });
    sorted
}

/// The records produced by one run
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub run_id: Uuid,
    pub run_timestamp: NaiveDateTime,
    pub records: Vec<CleanRecord>,
}

impl Report {
    pub fn new(run_id: Uuid, run_timestamp: NaiveDateTime, records: Vec<CleanRecord>) -> Self {
        Self {
            run_id,
            run_timestamp,
            records,
        }
    }

    pub fn timestamp_label(&self) -> String {
        self.run_timestamp.format(RUN_TIMESTAMP_FORMAT).to_string()
    }

    pub fn assessment(&self) -> BatchAssessment {
        BatchAssessment::from_scores(self.records.iter().map(|r| r.quality_score.value()))
    }

    pub fn render_onto(&self, existing: Option<Artifact>) -> Artifact {
        render(existing, &self.records, self.run_timestamp)
    }
}

/// Append this run's records after the existing rows, which are kept verbatim
pub fn render(
    existing: Option<Artifact>,
    records: &[CleanRecord],
    run_timestamp: NaiveDateTime,
) -> Artifact {
    let label = run_timestamp.format(RUN_TIMESTAMP_FORMAT).to_string();
    let mut artifact = existing.unwrap_or_default();
    artifact
        .rows
        .extend(records.iter().map(|record| ReportRow::from_record(record, &label)));
    artifact
}
