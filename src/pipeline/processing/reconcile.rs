use serde::Serialize;

use crate::domain::{Field, FieldValue, RecordFields, SourceTag, TargetDescriptor};
use crate::observability::metrics;
use crate::pipeline::processing::extract::ExtractedRecord;

/// Extracted fields merged with operator fallback metadata.
/// Every field carries a non-empty value and a source tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciledRecord {
    pub target_name: String,
    pub source_url: String,
    pub strategy: String,
    pub fields: RecordFields,
}

/// Live values win, then configured fallbacks, then the `Unknown` sentinel.
pub fn reconcile(target: &TargetDescriptor, extracted: &ExtractedRecord) -> ReconciledRecord {
    let fields = RecordFields::from_fn(|field| resolve(field, target, extracted));

    for (field, value) in fields.iter() {
        metrics::reconcile::field_sourced(field.as_str(), value.source.as_str());
    }

    ReconciledRecord {
        target_name: target.name.clone(),
        source_url: target.url.clone(),
        strategy: extracted.strategy().to_string(),
        fields,
    }
}

fn resolve(field: Field, target: &TargetDescriptor, extracted: &ExtractedRecord) -> FieldValue {
    if let Some(live) = extracted.get(field) {
        return FieldValue::live(live);
    }
    match target.fallback_for(field) {
        Some(fallback) => FieldValue::fallback(fallback),
        None => FieldValue::unknown(),
    }
}

impl ReconciledRecord {
    pub fn live_fields(&self) -> usize {
        self.fields.count_tagged(SourceTag::Live)
    }
}
