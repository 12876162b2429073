use std::collections::BTreeMap;

use scraper::Html;
use serde::Serialize;

use crate::constants::NO_CONTENT;
use crate::domain::Field;
use crate::pipeline::processing::normalize::text::collapse_whitespace;

pub mod registry;
pub mod strategies;

pub use registry::{ExtractionRegistry, SiteSignature};

/// Whether a field was found on the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Provenance {
    Live,
    Absent,
}

/// Fields a strategy found on one page. Anything not present is `Absent`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedRecord {
    strategy: String,
    fields: BTreeMap<Field, String>,
}

impl ExtractedRecord {
    pub fn new(strategy: &str) -> Self {
        Self {
            strategy: strategy.to_string(),
            fields: BTreeMap::new(),
        }
    }

    /// Record for a page that never arrived: every field absent
    pub fn absent() -> Self {
        Self::new(NO_CONTENT)
    }

    /// Keep the first non-blank value offered for a field.
    /// Returns true when the value was taken.
    pub fn fill<S: AsRef<str>>(&mut self, field: Field, value: Option<S>) -> bool {
        if self.fields.contains_key(&field) {
            return false;
        }
        let Some(value) = value else {
            return false;
        };
        let cleaned = collapse_whitespace(value.as_ref());
        if cleaned.is_empty() {
            return false;
        }
        self.fields.insert(field, cleaned);
        true
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    pub fn provenance(&self, field: Field) -> Provenance {
        if self.fields.contains_key(&field) {
            Provenance::Live
        } else {
            Provenance::Absent
        }
    }

    pub fn live_count(&self) -> usize {
        self.fields.len()
    }

    pub fn strategy(&self) -> &str {
        &self.strategy
    }
}

/// Extraction logic for one family of sites sharing markup conventions
pub trait SiteStrategy: Send + Sync {
    /// Short identifier for logs and reports
    fn family(&self) -> &'static str;

    /// Pull whatever fields the family's anchors reveal. Never invents values.
    fn extract(&self, page: &Html) -> ExtractedRecord;
}
