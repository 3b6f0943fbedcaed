use std::collections::BTreeSet;

use crate::models::PrescriptionRecord;

use super::cohort::{cohort_key, group_by_cohort, Cohorts};
use super::priority::score;
use super::types::EdgeCase;

/// Facility identity for the "different facilities" check. A record with no
/// facility is keyed by its own id, so it always counts as distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum FacilityKey {
    Known(i64),
    Missing(i64),
}

fn facility_key(record: &PrescriptionRecord) -> FacilityKey {
    match &record.facility {
        Some(facility) => FacilityKey::Known(facility.id),
        None => FacilityKey::Missing(record.id),
    }
}

/// What the active subset of one cohort looks like.
#[derive(Debug, Clone, PartialEq)]
pub struct CohortFindings {
    pub active_count: usize,
    pub different_facilities: bool,
    pub dose_changed: bool,
    pub top_priority: f64,
}

/// Summarizes the active members of a cohort.
pub fn analyze_cohort(members: &[&PrescriptionRecord]) -> CohortFindings {
    let active: Vec<&PrescriptionRecord> = members
        .iter()
        .copied()
        .filter(|record| record.is_active())
        .collect();

    let facilities: BTreeSet<FacilityKey> = active.iter().map(|r| facility_key(r)).collect();
    let doses: BTreeSet<&str> = active.iter().map(|r| r.dose.as_str()).collect();
    let top_priority = active
        .iter()
        .map(|r| score(r))
        .fold(f64::NEG_INFINITY, f64::max);

    CohortFindings {
        active_count: active.len(),
        different_facilities: facilities.len() > 1,
        dose_changed: doses.len() > 1,
        top_priority,
    }
}

/// Labels for one record given its cohort's findings.
///
/// Non-active records and records alone in their active group get nothing.
/// Labels are emitted in a fixed order: facilities, dose, priority.
pub fn edge_cases_for(record: &PrescriptionRecord, findings: &CohortFindings) -> Vec<EdgeCase> {
    if !record.is_active() || findings.active_count < 2 {
        return Vec::new();
    }

    let mut edge_cases = Vec::new();
    if findings.different_facilities {
        edge_cases.push(EdgeCase::DifferentFacilities);
    }
    if findings.dose_changed {
        edge_cases.push(EdgeCase::DoseChanged);
    }
    if score(record) != findings.top_priority {
        edge_cases.push(EdgeCase::LowerPriority);
    }
    edge_cases
}

/// Runs conflict detection against prebuilt cohorts, one label list per
/// input record, in input order.
pub fn detect_edge_cases(
    records: &[&PrescriptionRecord],
    cohorts: &Cohorts<'_>,
) -> Vec<Vec<EdgeCase>> {
    let findings: Vec<(_, CohortFindings)> = cohorts
        .iter()
        .map(|(key, members)| (key, analyze_cohort(members)))
        .collect();

    records
        .iter()
        .map(|record| {
            let key = cohort_key(record);
            findings
                .binary_search_by(|(k, _)| (*k).cmp(&key))
                .map(|idx| edge_cases_for(record, &findings[idx].1))
                .unwrap_or_default()
        })
        .collect()
}

/// Groups `records` and annotates each with its edge cases.
pub fn annotate<'a>(records: &[&'a PrescriptionRecord]) -> Vec<(&'a PrescriptionRecord, Vec<EdgeCase>)> {
    let cohorts = group_by_cohort(records);
    let edge_cases = detect_edge_cases(records, &cohorts);
    records.iter().copied().zip(edge_cases).collect()
}
