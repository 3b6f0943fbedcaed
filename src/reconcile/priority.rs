use crate::models::{PrescriptionRecord, SourceProvenance};

/// Multiplier applied to the source-type weight so type dominates confidence.
const TYPE_WEIGHT_SCALE: f64 = 10.0;

/// Priority of a record: `type_weight * 10 + confidence`.
pub fn score(record: &PrescriptionRecord) -> f64 {
    score_source(record.source.as_ref())
}

/// Scores bare provenance. A missing source scores 0.
pub fn score_source(source: Option<&SourceProvenance>) -> f64 {
    let Some(source) = source else {
        return 0.0;
    };

    let weight = f64::from(source.kind().weight());
    let confidence = if source.confidence.is_finite() {
        source.confidence
    } else {
        0.0
    };

    weight * TYPE_WEIGHT_SCALE + confidence
}
