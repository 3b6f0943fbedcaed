use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::PrescriptionRecord;

/// Effective end of a prescription's active window.
///
/// Variant order gives the total order: any ended date sorts before `Ongoing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EffectiveEnd {
    EndedOn(NaiveDate),
    Ongoing,
}

impl From<Option<NaiveDate>> for EffectiveEnd {
    fn from(end_date: Option<NaiveDate>) -> Self {
        match end_date {
            Some(date) => Self::EndedOn(date),
            None => Self::Ongoing,
        }
    }
}

/// Coarse presentation tier for a priority score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriorityLevel {
    High,
    Medium,
    Low,
}

/// Anomaly label attached to an active record within a conflicting cohort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EdgeCase {
    #[serde(rename = "Different facilities")]
    DifferentFacilities,
    #[serde(rename = "Dose changed")]
    DoseChanged,
    #[serde(rename = "Lower priority/conflicting")]
    LowerPriority,
}

impl EdgeCase {
    pub fn label(&self) -> &'static str {
        match self {
            Self::DifferentFacilities => "Different facilities",
            Self::DoseChanged => "Dose changed",
            Self::LowerPriority => "Lower priority/conflicting",
        }
    }
}

impl std::fmt::Display for EdgeCase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Grouping key for conflict analysis: patient id plus medication *name*.
///
/// Name-based on purpose: two medication rows with different ids but the
/// same display name land in one cohort. Matching is exact and case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct CohortKey {
    pub patient_id: i64,
    pub medication_name: String,
}

/// Caller-supplied range bounds. Each bound applies independently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileParams {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// A record plus everything the engine derived for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedRecord {
    #[serde(flatten)]
    pub record: PrescriptionRecord,
    pub priority: f64,
    pub priority_level: PriorityLevel,
    pub edge_cases: Vec<EdgeCase>,
}

impl EnrichedRecord {
    pub fn is_flagged(&self) -> bool {
        !self.edge_cases.is_empty()
    }
}

/// Records sharing a medication name, in recency order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MedicationGroup {
    pub medication_name: String,
    pub records: Vec<EnrichedRecord>,
}

/// Header counts for the timeline view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconciliationSummary {
    pub total: usize,
    pub active: usize,
    pub ongoing: usize,
    pub flagged: usize,
}

/// Complete output of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciliationResult {
    pub records: Vec<EnrichedRecord>,
    pub by_medication: Vec<MedicationGroup>,
    pub summary: ReconciliationSummary,
}
