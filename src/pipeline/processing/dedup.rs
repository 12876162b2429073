use std::collections::HashMap;

use tracing::debug;

use crate::observability::metrics;
use crate::pipeline::processing::normalize::CleanRecord;

/// Streaming deduplicator over clean records.
///
/// Records sharing a `(lower-cased name, mobile number)` key collapse to one.
/// The kept record holds the first-seen position; a later duplicate only
/// replaces it when its quality score is strictly higher.
#[derive(Debug, Default)]
pub struct Deduplicator {
    seen: HashMap<(String, String), usize>,
    kept: Vec<CleanRecord>,
    discarded: usize,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offer(&mut self, record: CleanRecord) {
        let key = record.dedup_key();
        match self.seen.get(&key) {
            Some(&index) => {
                let existing = &mut self.kept[index];
                self.discarded += 1;
                metrics::dedup::duplicate_discarded();
                if record.quality_score > existing.quality_score {
                    debug!(
                        name = %key.0,
                        kept = %record.target_name,
                        replaced = %existing.target_name,
                        "duplicate with higher score replaces earlier record"
                    );
                    *existing = record;
                } else {
                    debug!(
                        name = %key.0,
                        kept = %existing.target_name,
                        dropped = %record.target_name,
                        "duplicate discarded"
                    );
                }
            }
            None => {
                self.seen.insert(key, self.kept.len());
                self.kept.push(record);
            }
        }
    }

    /// Number of records dropped so far
    pub fn discarded(&self) -> usize {
        self.discarded
    }

    pub fn finish(self) -> Vec<CleanRecord> {
        self.kept
    }
}

/// Collapse duplicates in one pass; applying it again changes nothing
pub fn dedup(records: Vec<CleanRecord>) -> Vec<CleanRecord> {
    let mut deduplicator = Deduplicator::new();
    for record in records {
        deduplicator.offer(record);
    }
    deduplicator.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FieldValue, RecordFields};
    use crate::pipeline::processing::quality_gate::QualityScore;

    fn record(target: &str, name: &str, mobile: &str, score: f64) -> CleanRecord {
        CleanRecord {
            target_name: target.to_string(),
            source_url: format!("https://{target}.example"),
            strategy: "generic".to_string(),
            fields: RecordFields {
                name: FieldValue::live(name),
                location: FieldValue::unknown(),
                project_type: FieldValue::unknown(),
                contact_name: FieldValue::unknown(),
                mobile_number: FieldValue::live(mobile),
            },
            quality_score: QualityScore::new(score),
        }
    }

    fn targets(records: &[CleanRecord]) -> Vec<&str> {
        records.iter().map(|r| r.target_name.as_str()).collect()
    }

    #[test]
    fn test_higher_score_replaces_in_place() {
        let out = dedup(vec![
            record("a", "Acme", "+15551234567", 0.5),
            record("b", "Other", "+15550000000", 0.5),
            record("c", "ACME", "+15551234567", 0.8),
        ]);
        assert_eq!(targets(&out), vec!["c", "b"]);
    }

    #[test]
    fn test_tie_keeps_first_seen() {
        let out = dedup(vec![
            record("a", "Acme", "+15551234567", 0.5),
            record("b", "acme", "+15551234567", 0.5),
            record("c", "Acme", "+15551234567", 0.2),
        ]);
        assert_eq!(targets(&out), vec!["a"]);
    }

    #[test]
    fn test_same_name_different_mobile_are_distinct() {
        let out = dedup(vec![
            record("a", "Acme", "+15551234567", 0.5),
            record("b", "Acme", "Unknown", 0.5),
        ]);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_dedup_is_idempotent() {
        let once = dedup(vec![
            record("a", "Acme", "+15551234567", 0.3),
            record("b", "Beta", "+15550000000", 0.6),
            record("c", "acme", "+15551234567", 0.9),
            record("d", "Beta", "+15550000000", 0.6),
        ]);
        let twice = dedup(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_discarded_count() {
        let mut deduplicator = Deduplicator::new();
        deduplicator.offer(record("a", "Acme", "+1", 0.1));
        deduplicator.offer(record("b", "Acme", "+1", 0.9));
        deduplicator.offer(record("c", "Acme", "+1", 0.1));
        assert_eq!(deduplicator.discarded(), 2);
        assert_eq!(targets(&deduplicator.finish()), vec!["b"]);
    }
}
