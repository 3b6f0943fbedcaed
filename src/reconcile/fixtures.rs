//! Record builders shared by the engine tests.

use chrono::NaiveDate;

use crate::models::enums::PrescriptionStatus;
use crate::models::{EntityRef, PrescriptionRecord, SourceProvenance};

pub(crate) fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub(crate) struct RecordBuilder {
    record: PrescriptionRecord,
}

impl RecordBuilder {
    /// Active, ongoing Aspirin 100mg for patient 1 at facility 1, manual source.
    pub(crate) fn new(id: i64) -> Self {
        Self {
            record: PrescriptionRecord {
                id,
                patient: EntityRef::new(1, "Alice Smith"),
                medication: EntityRef::new(1, "Aspirin"),
                facility: Some(EntityRef::new(1, "X Hospital")),
                dose: "100mg".into(),
                start_date: date("2026-01-01"),
                end_date: None,
                status: PrescriptionStatus::Active,
                source: Some(SourceProvenance {
                    kind: "manual".into(),
                    label: "Manual Entry".into(),
                    confidence: 0.0,
                }),
            },
        }
    }

    pub(crate) fn patient(mut self, id: i64) -> Self {
        self.record.patient = EntityRef::new(id, format!("Patient {id}"));
        self
    }

    pub(crate) fn medication(mut self, id: i64, name: &str) -> Self {
        self.record.medication = EntityRef::new(id, name);
        self
    }

    pub(crate) fn facility(mut self, id: i64) -> Self {
        self.record.facility = Some(EntityRef::new(id, format!("Facility {id}")));
        self
    }

    pub(crate) fn no_facility(mut self) -> Self {
        self.record.facility = None;
        self
    }

    pub(crate) fn dose(mut self, dose: &str) -> Self {
        self.record.dose = dose.into();
        self
    }

    pub(crate) fn start(mut self, start: &str) -> Self {
        self.record.start_date = date(start);
        self
    }

    pub(crate) fn end(mut self, end: &str) -> Self {
        self.record.end_date = Some(date(end));
        self
    }

    pub(crate) fn status(mut self, status: PrescriptionStatus) -> Self {
        self.record.status = status;
        self
    }

    pub(crate) fn source(mut self, kind: &str, confidence: f64) -> Self {
        self.record.source = Some(SourceProvenance {
            kind: kind.into(),
            label: kind.to_uppercase(),
            confidence,
        });
        self
    }

    pub(crate) fn no_source(mut self) -> Self {
        self.record.source = None;
        self
    }

    pub(crate) fn build(self) -> PrescriptionRecord {
        self.record
    }
}
