use crate::models::PrescriptionRecord;

use super::types::ReconcileParams;

/// Keeps records that started on/after `start_date` and ended on/before
/// `end_date`. Bounds are independent; an ongoing record never satisfies
/// an upper bound.
pub fn filter_by_range<'a>(
    records: &'a [PrescriptionRecord],
    params: &ReconcileParams,
) -> Vec<&'a PrescriptionRecord> {
    records
        .iter()
        .filter(|record| within_range(record, params))
        .collect()
}

pub fn within_range(record: &PrescriptionRecord, params: &ReconcileParams) -> bool {
    if let Some(start) = params.start_date {
        if record.start_date < start {
            return false;
        }
    }

    if let Some(end) = params.end_date {
        match record.end_date {
            Some(record_end) if record_end <= end => {}
            _ => return false,
        }
    }

    true
}
