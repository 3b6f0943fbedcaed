//! Demo dataset for a fresh record store.

use chrono::NaiveDate;
use rusqlite::Connection;

use super::repository::*;
use super::DatabaseError;
use crate::models::enums::{FacilityType, PrescriptionStatus};
use crate::models::NewPrescription;

struct DemoPrescription {
    patient: &'static str,
    medication: &'static str,
    facility: &'static str,
    dose: &'static str,
    start: (i32, u32, u32),
    end: Option<(i32, u32, u32)>,
    status: PrescriptionStatus,
    source: &'static str,
}

const PATIENTS: &[&str] = &["Alice Smith", "Bob Jones", "Charlie Brown"];
const MEDICATIONS: &[&str] = &["Aspirin", "Ibuprofen", "Paracetamol"];
const FACILITIES: &[(&str, FacilityType, &str)] = &[
    ("X Hospital", FacilityType::Hospital, "123 Hospital St"),
    ("Y Clinic", FacilityType::Clinic, "456 Clinic St"),
    ("Z Pharmacy", FacilityType::Pharmacy, "789 Pharmacy St"),
    ("K Other", FacilityType::Other, "246 Other St"),
];
const SOURCES: &[(&str, &str, i64)] = &[("ehr", "EHR System", 5), ("manual", "Manual Entry", 4)];

const PRESCRIPTIONS: &[DemoPrescription] = &[
    DemoPrescription {
        patient: "Alice Smith",
        medication: "Aspirin",
        facility: "X Hospital",
        dose: "100mg",
        start: (2026, 1, 1),
        end: Some((2026, 1, 10)),
        status: PrescriptionStatus::Stopped,
        source: "ehr",
    },
    DemoPrescription {
        patient: "Alice Smith",
        medication: "Aspirin",
        facility: "Y Clinic",
        dose: "100mg",
        start: (2026, 1, 11),
        end: Some((2026, 1, 20)),
        status: PrescriptionStatus::Active,
        source: "manual",
    },
    DemoPrescription {
        patient: "Bob Jones",
        medication: "Ibuprofen",
        facility: "Y Clinic",
        dose: "200mg",
        start: (2026, 1, 5),
        end: None,
        status: PrescriptionStatus::Active,
        source: "ehr",
    },
    DemoPrescription {
        patient: "Charlie Brown",
        medication: "Paracetamol",
        facility: "Z Pharmacy",
        dose: "500mg",
        start: (2026, 1, 1),
        end: Some((2026, 1, 10)),
        status: PrescriptionStatus::Stopped,
        source: "manual",
    },
    DemoPrescription {
        patient: "Charlie Brown",
        medication: "Paracetamol",
        facility: "Z Pharmacy",
        dose: "1000mg",
        start: (2026, 1, 11),
        end: None,
        status: PrescriptionStatus::Active,
        source: "manual",
    },
];

fn demo_date((y, m, d): (i32, u32, u32)) -> Result<NaiveDate, DatabaseError> {
    NaiveDate::from_ymd_opt(y, m, d)
        .ok_or_else(|| DatabaseError::ConstraintViolation(format!("invalid demo date {y}-{m}-{d}")))
}

fn lookup(ids: &[(&'static str, i64)], name: &str) -> Result<i64, DatabaseError> {
    ids.iter()
        .find(|(n, _)| *n == name)
        .map(|(_, id)| *id)
        .ok_or_else(|| DatabaseError::NotFound {
            entity_type: "demo entity".into(),
            id: name.into(),
        })
}

/// Populate the store with the demo dataset.
///
/// Returns `false` without touching anything when prescriptions already
/// exist. Reference rows are matched by value, so re-running after a partial
/// seed does not duplicate them.
pub fn seed_demo_data(conn: &Connection) -> Result<bool, DatabaseError> {
    if count_prescriptions(conn)? > 0 {
        tracing::debug!("Record store already populated, skipping demo seed");
        return Ok(false);
    }

    let tx = conn.unchecked_transaction()?;

    let mut patients = Vec::new();
    for name in PATIENTS {
        patients.push((*name, get_or_create_patient(&tx, name)?.id));
    }
    let mut medications = Vec::new();
    for name in MEDICATIONS {
        medications.push((*name, get_or_create_medication(&tx, name)?.id));
    }
    let mut facilities = Vec::new();
    for (name, facility_type, address) in FACILITIES {
        facilities.push((*name, get_or_create_facility(&tx, name, *facility_type, address)?.id));
    }
    let mut sources = Vec::new();
    for (kind, label, confidence) in SOURCES {
        sources.push((*kind, get_or_create_source(&tx, kind, label, *confidence)?.id));
    }

    for demo in PRESCRIPTIONS {
        let rx = NewPrescription {
            patient_id: lookup(&patients, demo.patient)?,
            medication_id: lookup(&medications, demo.medication)?,
            facility_id: lookup(&facilities, demo.facility)?,
            dose: demo.dose.to_string(),
            start_date: demo_date(demo.start)?,
            end_date: demo.end.map(demo_date).transpose()?,
            status: demo.status,
            source_id: lookup(&sources, demo.source)?,
        };
        if !prescription_exists(&tx, &rx)? {
            insert_prescription(&tx, &rx)?;
        }
    }

    tx.commit()?;
    tracing::info!(
        prescriptions = PRESCRIPTIONS.len(),
        "Seeded record store with demo data"
    );
    Ok(true)
}
