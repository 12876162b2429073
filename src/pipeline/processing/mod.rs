// Pipeline processing: extraction, reconciliation, normalization, scoring and dedup

pub mod dedup;
pub mod extract;
pub mod normalize;
pub mod quality_gate;
pub mod reconcile;

pub use dedup::{dedup, Deduplicator};
pub use extract::{ExtractedRecord, ExtractionRegistry, Provenance, SiteSignature, SiteStrategy};
pub use normalize::{CleanRecord, Normalizer};
pub use quality_gate::{BatchAssessment, QualityBand, QualityGate, QualityScore};
pub use reconcile::{reconcile, ReconciledRecord};
