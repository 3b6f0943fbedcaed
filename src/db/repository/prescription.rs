use std::str::FromStr;

use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};

use crate::db::DatabaseError;
use crate::models::enums::PrescriptionStatus;
use crate::models::*;

pub fn insert_prescription(conn: &Connection, rx: &NewPrescription) -> Result<i64, DatabaseError> {
    if let Some(end) = rx.end_date {
        if end < rx.start_date {
            return Err(DatabaseError::ConstraintViolation(format!(
                "end_date {end} precedes start_date {}",
                rx.start_date
            )));
        }
    }

    conn.execute(
        "INSERT INTO prescriptions (patient_id, medication_id, facility_id, dose,
         start_date, end_date, status, source_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            rx.patient_id,
            rx.medication_id,
            rx.facility_id,
            rx.dose,
            rx.start_date,
            rx.end_date,
            rx.status.as_str(),
            rx.source_id,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Returns true when an identical prescription row already exists.
pub fn prescription_exists(conn: &Connection, rx: &NewPrescription) -> Result<bool, DatabaseError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM prescriptions
         WHERE patient_id = ?1 AND medication_id = ?2 AND facility_id = ?3 AND dose = ?4
           AND start_date = ?5 AND end_date IS ?6 AND status = ?7 AND source_id = ?8",
        params![
            rx.patient_id,
            rx.medication_id,
            rx.facility_id,
            rx.dose,
            rx.start_date,
            rx.end_date,
            rx.status.as_str(),
            rx.source_id,
        ],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn count_prescriptions(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row("SELECT COUNT(*) FROM prescriptions", [], |row| row.get(0))?;
    Ok(count)
}

/// Raw row before enum parsing.
struct PrescriptionRow {
    id: i64,
    patient_id: i64,
    patient_name: String,
    medication_id: i64,
    medication_name: String,
    facility_id: i64,
    facility_name: String,
    dose: String,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
    status: String,
    source_type: String,
    source_label: String,
    source_confidence: i64,
}

fn prescription_row(row: &Row<'_>) -> rusqlite::Result<PrescriptionRow> {
    Ok(PrescriptionRow {
        id: row.get("id")?,
        patient_id: row.get("patient_id")?,
        patient_name: row.get("patient_name")?,
        medication_id: row.get("medication_id")?,
        medication_name: row.get("medication_name")?,
        facility_id: row.get("facility_id")?,
        facility_name: row.get("facility_name")?,
        dose: row.get("dose")?,
        start_date: row.get("start_date")?,
        end_date: row.get("end_date")?,
        status: row.get("status")?,
        source_type: row.get("source_type")?,
        source_label: row.get("source_label")?,
        source_confidence: row.get("source_confidence")?,
    })
}

fn prescription_from_row(row: PrescriptionRow) -> Result<PrescriptionRecord, DatabaseError> {
    Ok(PrescriptionRecord {
        id: row.id,
        patient: EntityRef::new(row.patient_id, row.patient_name),
        medication: EntityRef::new(row.medication_id, row.medication_name),
        facility: Some(EntityRef::new(row.facility_id, row.facility_name)),
        dose: row.dose,
        start_date: row.start_date,
        end_date: row.end_date,
        status: PrescriptionStatus::from_str(&row.status)?,
        source: Some(SourceProvenance {
            kind: row.source_type,
            label: row.source_label,
            confidence: row.source_confidence as f64,
        }),
    })
}

/// Fetch prescriptions joined with their related entities.
///
/// The date window applies only when both `start` and `end` are set, and
/// selects records overlapping it (ongoing records overlap any window that
/// ends after they started). Sorted by start date, newest first.
pub fn list_prescriptions(
    conn: &Connection,
    filter: &PrescriptionFilter,
) -> Result<Vec<PrescriptionRecord>, DatabaseError> {
    let mut sql = String::from(
        "SELECT p.id, p.dose, p.start_date, p.end_date, p.status,
                p.patient_id, pt.name AS patient_name,
                p.medication_id, m.name AS medication_name,
                p.facility_id, f.name AS facility_name,
                s.type AS source_type, s.label AS source_label,
                s.confidence AS source_confidence
         FROM prescriptions p
         JOIN patients pt ON p.patient_id = pt.id
         JOIN medications m ON p.medication_id = m.id
         JOIN facilities f ON p.facility_id = f.id
         JOIN sources s ON p.source_id = s.id
         WHERE 1=1",
    );

    let mut params_vec: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();
    let mut param_idx = 1;

    if let Some(patient_id) = filter.patient_id {
        sql.push_str(&format!(" AND p.patient_id = ?{param_idx}"));
        params_vec.push(Box::new(patient_id));
        param_idx += 1;
    }

    if let Some(status) = filter.status {
        sql.push_str(&format!(" AND p.status = ?{param_idx}"));
        params_vec.push(Box::new(status.as_str()));
        param_idx += 1;
    }

    if let Some((start, end)) = filter.window() {
        sql.push_str(&format!(" AND p.start_date <= ?{param_idx}"));
        params_vec.push(Box::new(end));
        param_idx += 1;

        sql.push_str(&format!(
            " AND (p.end_date >= ?{param_idx} OR p.end_date IS NULL)"
        ));
        params_vec.push(Box::new(start));
    }

    sql.push_str(" ORDER BY p.start_date DESC, p.id DESC");

    let mut stmt = conn.prepare(&sql)?;
    let param_refs: Vec<&dyn rusqlite::types::ToSql> =
        params_vec.iter().map(|p| p.as_ref()).collect();
    let rows = stmt.query_map(param_refs.as_slice(), prescription_row)?;

    let mut records = Vec::new();
    for row in rows {
        records.push(prescription_from_row(row?)?);
    }
    Ok(records)
}
