use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

use crate::domain::{Field, RecordFields, SourceTag};
use crate::observability::metrics;

/// Scores at or above this are `High`
pub const HIGH_BAND_THRESHOLD: f64 = 0.7;
/// Scores at or above this (and below high) are `Medium`
pub const MEDIUM_BAND_THRESHOLD: f64 = 0.4;
/// Batch averages below this are logged as a warning
pub const LOW_AVERAGE_WARNING: f64 = 0.4;

/// Relative importance of each field being found live on the page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityWeights {
    pub name: u32,
    pub location: u32,
    pub project_type: u32,
    pub contact_name: u32,
    pub mobile_number: u32,
}

impl Default for QualityWeights {
    fn default() -> Self {
        Self {
            name: 2,
            location: 1,
            project_type: 1,
            contact_name: 3,
            mobile_number: 3,
        }
    }
}

impl QualityWeights {
    pub fn weight(&self, field: Field) -> u32 {
        match field {
            Field::Name => self.name,
            Field::Location => self.location,
            Field::ProjectType => self.project_type,
            Field::ContactName => self.contact_name,
            Field::MobileNumber => self.mobile_number,
        }
    }

    pub fn total(&self) -> u32 {
        Field::ALL.iter().map(|f| self.weight(*f)).sum()
    }
}

/// Weighted fraction of live fields, in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct QualityScore(f64);

impl QualityScore {
    pub fn new(value: f64) -> Self {
        Self(value.clamp(0.0, 1.0))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn band(&self) -> QualityBand {
        QualityBand::from_score(self.0)
    }
}

impl fmt::Display for QualityScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Three-tier quality band shown as the row fill in the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QualityBand {
    High,
    Medium,
    Low,
}

impl QualityBand {
    pub const ALL: [QualityBand; 3] = [QualityBand::High, QualityBand::Medium, QualityBand::Low];

    pub fn from_score(score: f64) -> Self {
        if score >= HIGH_BAND_THRESHOLD {
            QualityBand::High
        } else if score >= MEDIUM_BAND_THRESHOLD {
            QualityBand::Medium
        } else {
            QualityBand::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            QualityBand::High => "high",
            QualityBand::Medium => "medium",
            QualityBand::Low => "low",
        }
    }

    /// RGB fill: green, amber, red
    pub fn fill_color(&self) -> u32 {
        match self {
            QualityBand::High => 0xC6EFCE,
            QualityBand::Medium => 0xFFEB9C,
            QualityBand::Low => 0xFFC7CE,
        }
    }
}

impl fmt::Display for QualityBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Scores reconciled records by how much of them came from the live page
#[derive(Debug, Clone, Default)]
pub struct QualityGate {
    pub weights: QualityWeights,
}

impl QualityGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weights(weights: QualityWeights) -> Self {
        Self { weights }
    }

    /// Σ weight(live fields) / Σ weight(all fields)
    pub fn score(&self, fields: &RecordFields) -> QualityScore {
        let total = self.weights.total();
        if total == 0 {
            return QualityScore::new(0.0);
        }
        let live: u32 = fields
            .iter()
            .filter(|(_, value)| value.source == SourceTag::Live)
            .map(|(field, _)| self.weights.weight(field))
            .sum();

        let score = QualityScore::new(f64::from(live) / f64::from(total));
        metrics::quality::score_recorded(score.value());
        metrics::quality::band_assigned(score.band().label());
        score
    }
}

/// Per-band record counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BandCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl BandCounts {
    pub fn add(&mut self, band: QualityBand) {
        match band {
            QualityBand::High => self.high += 1,
            QualityBand::Medium => self.medium += 1,
            QualityBand::Low => self.low += 1,
        }
    }

    pub fn get(&self, band: QualityBand) -> usize {
        match band {
            QualityBand::High => self.high,
            QualityBand::Medium => self.medium,
            QualityBand::Low => self.low,
        }
    }
}

/// Score statistics over a batch of records
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchAssessment {
    pub count: usize,
    pub average: f64,
    pub min: f64,
    pub max: f64,
    pub bands: BandCounts,
}

impl BatchAssessment {
    pub fn from_scores(scores: impl IntoIterator<Item = f64>) -> Self {
        let mut assessment = BatchAssessment {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            ..Default::default()
        };
        let mut sum = 0.0;
        for score in scores {
            assessment.count += 1;
            sum += score;
            assessment.min = assessment.min.min(score);
            assessment.max = assessment.max.max(score);
            assessment.bands.add(QualityBand::from_score(score));
        }

        if assessment.count == 0 {
            return BatchAssessment::default();
        }
        assessment.average = sum / assessment.count as f64;
        assessment
    }

    pub fn is_low_quality(&self) -> bool {
        self.count > 0 && self.average < LOW_AVERAGE_WARNING
    }

    /// Log the batch statistics, warning when overall quality is poor
    pub fn log(&self) {
        info!(
            records = self.count,
            average = self.average,
            min = self.min,
            max = self.max,
            high = self.bands.high,
            medium = self.bands.medium,
            low = self.bands.low,
            "batch quality assessment"
        );
        if self.is_low_quality() {
            warn!(
                average = self.average,
                threshold = LOW_AVERAGE_WARNING,
                "average quality score is low; most fields came from fallback metadata"
            );
        }
    }
}
