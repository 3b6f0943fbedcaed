use std::cmp::Ordering;

use crate::models::PrescriptionRecord;

use super::types::EffectiveEnd;

pub fn effective_end(record: &PrescriptionRecord) -> EffectiveEnd {
    EffectiveEnd::from(record.end_date)
}

/// Most recent first: effective end descending, then start date descending.
pub fn compare_recency(a: &PrescriptionRecord, b: &PrescriptionRecord) -> Ordering {
    effective_end(b)
        .cmp(&effective_end(a))
        .then_with(|| b.start_date.cmp(&a.start_date))
}

/// Stable sort; records with equal keys keep their input order.
pub fn sort_by_recency(records: &mut [&PrescriptionRecord]) {
    records.sort_by(|a, b| compare_recency(a, b));
}
