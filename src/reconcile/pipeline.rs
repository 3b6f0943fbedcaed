use std::collections::BTreeMap;

use crate::models::PrescriptionRecord;

use super::chronology::sort_by_recency;
use super::cohort::group_by_cohort;
use super::conflict::detect_edge_cases;
use super::level::classify;
use super::priority::score;
use super::range::filter_by_range;
use super::types::*;

/// One deterministic pass: filter, sort, score, group, flag.
///
/// Inputs are never mutated; the same records and params always yield the
/// same result.
pub fn reconcile(records: &[PrescriptionRecord], params: &ReconcileParams) -> ReconciliationResult {
    let mut retained = filter_by_range(records, params);
    sort_by_recency(&mut retained);

    let cohorts = group_by_cohort(&retained);
    let edge_cases = detect_edge_cases(&retained, &cohorts);

    let enriched: Vec<EnrichedRecord> = retained
        .iter()
        .zip(edge_cases)
        .map(|(record, edge_cases)| {
            let priority = score(record);
            EnrichedRecord {
                record: (*record).clone(),
                priority,
                priority_level: classify(priority),
                edge_cases,
            }
        })
        .collect();

    let summary = summarize(&enriched);

    tracing::debug!(
        input = records.len(),
        retained = enriched.len(),
        cohorts = cohorts.len(),
        flagged = summary.flagged,
        "Reconciliation pass complete"
    );

    ReconciliationResult {
        by_medication: group_by_medication(&enriched),
        records: enriched,
        summary,
    }
}

/// Secondary grouping for display: by medication name alone, groups ordered
/// by name, records kept in the order given.
pub fn group_by_medication(records: &[EnrichedRecord]) -> Vec<MedicationGroup> {
    let mut groups: BTreeMap<&str, Vec<EnrichedRecord>> = BTreeMap::new();
    for record in records {
        groups
            .entry(record.record.medication.name.as_str())
            .or_default()
            .push(record.clone());
    }

    groups
        .into_iter()
        .map(|(name, records)| MedicationGroup {
            medication_name: name.to_string(),
            records,
        })
        .collect()
}

fn summarize(records: &[EnrichedRecord]) -> ReconciliationSummary {
    let mut summary = ReconciliationSummary {
        total: records.len(),
        ..ReconciliationSummary::default()
    };

    for record in records {
        if record.record.is_active() {
            summary.active += 1;
        }
        if record.record.is_ongoing() {
            summary.ongoing += 1;
        }
        if record.is_flagged() {
            summary.flagged += 1;
        }
    }

    summary
}
