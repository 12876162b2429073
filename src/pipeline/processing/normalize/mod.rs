use serde::Serialize;
use tracing::debug;

use crate::domain::{Field, FieldValue, RecordFields};
use crate::observability::metrics;
use crate::pipeline::processing::quality_gate::{QualityGate, QualityScore};
use crate::pipeline::processing::reconcile::ReconciledRecord;

pub mod phone;
pub mod text;

pub use phone::{normalize_mobile, PhonePolicy};

/// A normalized record with its completeness score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanRecord {
    pub target_name: String,
    pub source_url: String,
    pub strategy: String,
    pub fields: RecordFields,
    pub quality_score: QualityScore,
}

impl CleanRecord {
    /// Dedup key: lower-cased name and canonical mobile number
    pub fn dedup_key(&self) -> (String, String) {
        (
            self.fields.name.value.to_lowercase(),
            self.fields.mobile_number.value.clone(),
        )
    }
}

/// Cleans field formats and scores the result
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    pub phone_policy: PhonePolicy,
    pub gate: QualityGate,
}

impl Normalizer {
    pub fn new(phone_policy: PhonePolicy, gate: QualityGate) -> Self {
        Self { phone_policy, gate }
    }

    pub fn normalize(&self, record: ReconciledRecord) -> CleanRecord {
        let ReconciledRecord {
            target_name,
            source_url,
            strategy,
            mut fields,
        } = record;

        for field in Field::ALL {
            let slot = fields.get_mut(field);
            if slot.is_unknown() {
                continue;
            }
            match self.clean(field, &slot.value) {
                Some(value) => slot.value = value,
                None => {
                    debug!(target_name = %target_name, field = %field, raw = %slot.value, "value rejected during normalization");
                    if field == Field::MobileNumber {
                        metrics::normalize::phone_rejected();
                    }
                    *slot = FieldValue::unknown();
                }
            }
        }

        let quality_score = self.gate.score(&fields);
        CleanRecord {
            target_name,
            source_url,
            strategy,
            fields,
            quality_score,
        }
    }

    /// Canonical form of one field value; `None` when nothing usable is left
    fn clean(&self, field: Field, raw: &str) -> Option<String> {
        let collapsed = text::collapse_whitespace(raw);
        let cleaned = match field {
            Field::Name | Field::Location | Field::ContactName => text::title_case(&collapsed),
            Field::ProjectType => text::standardize_project_type(&collapsed),
            Field::MobileNumber => normalize_mobile(&collapsed, &self.phone_policy)?,
        };
        (!cleaned.is_empty()).then_some(cleaned)
    }
}
