use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::enums::PrescriptionStatus;
use super::source::SourceProvenance;

/// Identifier plus display name of a related entity owned by the record service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: i64,
    pub name: String,
}

impl EntityRef {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// One prescription as fetched from a record source. Read-only snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrescriptionRecord {
    pub id: i64,
    pub patient: EntityRef,
    pub medication: EntityRef,
    /// `None` when the upstream record carried no usable facility.
    pub facility: Option<EntityRef>,
    pub dose: String,
    pub start_date: NaiveDate,
    /// `None` means the prescription is ongoing.
    pub end_date: Option<NaiveDate>,
    pub status: PrescriptionStatus,
    pub source: Option<SourceProvenance>,
}

impl PrescriptionRecord {
    pub fn is_active(&self) -> bool {
        self.status == PrescriptionStatus::Active
    }

    pub fn is_ongoing(&self) -> bool {
        self.end_date.is_none()
    }
}

/// Insert payload for the record store; related entities by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPrescription {
    pub patient_id: i64,
    pub medication_id: i64,
    pub facility_id: i64,
    pub dose: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub status: PrescriptionStatus,
    pub source_id: i64,
}
