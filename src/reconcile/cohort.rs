use std::collections::BTreeMap;

use crate::models::PrescriptionRecord;

use super::types::CohortKey;

/// Cohorts ordered by key; members keep input order.
pub type Cohorts<'a> = BTreeMap<CohortKey, Vec<&'a PrescriptionRecord>>;

pub fn cohort_key(record: &PrescriptionRecord) -> CohortKey {
    CohortKey {
        patient_id: record.patient.id,
        medication_name: record.medication.name.clone(),
    }
}

/// Partitions records by (patient, medication name). Group after sorting
/// to get recency-ordered cohorts.
pub fn group_by_cohort<'a>(records: &[&'a PrescriptionRecord]) -> Cohorts<'a> {
    let mut cohorts: Cohorts<'a> = BTreeMap::new();
    for record in records {
        cohorts.entry(cohort_key(record)).or_default().push(*record);
    }
    cohorts
}
