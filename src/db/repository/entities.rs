use std::str::FromStr;

use rusqlite::{params, Connection, OptionalExtension};

use crate::db::DatabaseError;
use crate::models::enums::FacilityType;
use crate::models::*;

// ═══════════════════════════════════════════
// Patients
// ═══════════════════════════════════════════

pub fn insert_patient(conn: &Connection, name: &str) -> Result<i64, DatabaseError> {
    conn.execute("INSERT INTO patients (name) VALUES (?1)", params![name])?;
    Ok(conn.last_insert_rowid())
}

pub fn get_patient(conn: &Connection, id: i64) -> Result<Option<Patient>, DatabaseError> {
    let patient = conn
        .query_row(
            "SELECT id, name FROM patients WHERE id = ?1",
            params![id],
            |row| {
                Ok(Patient {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            },
        )
        .optional()?;
    Ok(patient)
}

/// Returns the first patient with this exact name, creating it if absent.
pub fn get_or_create_patient(conn: &Connection, name: &str) -> Result<Patient, DatabaseError> {
    let existing: Option<i64> = conn
        .query_row(
            "SELECT id FROM patients WHERE name = ?1 ORDER BY id LIMIT 1",
            params![name],
            |row| row.get(0),
        )
        .optional()?;
    let id = match existing {
        Some(id) => id,
        None => insert_patient(conn, name)?,
    };
    Ok(Patient {
        id,
        name: name.to_string(),
    })
}

pub fn list_patients(conn: &Connection) -> Result<Vec<Patient>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT id, name FROM patients ORDER BY id")?;
    let rows = stmt.query_map([], |row| {
        Ok(Patient {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

// ═══════════════════════════════════════════
// Medications
// ═══════════════════════════════════════════

pub fn insert_medication(conn: &Connection, name: &str) -> Result<i64, DatabaseError> {
    conn.execute("INSERT INTO medications (name) VALUES (?1)", params![name])?;
    Ok(conn.last_insert_rowid())
}

pub fn get_or_create_medication(
    conn: &Connection,
    name: &str,
) -> Result<Medication, DatabaseError> {
    let existing: Option<i64> = conn
        .query_row(
            "SELECT id FROM medications WHERE name = ?1 ORDER BY id LIMIT 1",
            params![name],
            |row| row.get(0),
        )
        .optional()?;
    let id = match existing {
        Some(id) => id,
        None => insert_medication(conn, name)?,
    };
    Ok(Medication {
        id,
        name: name.to_string(),
    })
}

pub fn list_medications(conn: &Connection) -> Result<Vec<Medication>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT id, name FROM medications ORDER BY id")?;
    let rows = stmt.query_map([], |row| {
        Ok(Medication {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

// ═══════════════════════════════════════════
// Facilities
// ═══════════════════════════════════════════

pub fn insert_facility(
    conn: &Connection,
    name: &str,
    facility_type: FacilityType,
    address: &str,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO facilities (name, type, address) VALUES (?1, ?2, ?3)",
        params![name, facility_type.as_str(), address],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_or_create_facility(
    conn: &Connection,
    name: &str,
    facility_type: FacilityType,
    address: &str,
) -> Result<Facility, DatabaseError> {
    let existing: Option<i64> = conn
        .query_row(
            "SELECT id FROM facilities WHERE name = ?1 AND type = ?2 AND address = ?3
             ORDER BY id LIMIT 1",
            params![name, facility_type.as_str(), address],
            |row| row.get(0),
        )
        .optional()?;
    let id = match existing {
        Some(id) => id,
        None => insert_facility(conn, name, facility_type, address)?,
    };
    Ok(Facility {
        id,
        name: name.to_string(),
        facility_type,
        address: address.to_string(),
    })
}

pub fn list_facilities(conn: &Connection) -> Result<Vec<Facility>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT id, name, type, address FROM facilities ORDER BY id")?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
        ))
    })?;

    let mut facilities = Vec::new();
    for row in rows {
        let (id, name, facility_type, address) = row?;
        facilities.push(Facility {
            id,
            name,
            facility_type: FacilityType::from_str(&facility_type)?,
            address,
        });
    }
    Ok(facilities)
}

// ═══════════════════════════════════════════
// Sources
// ═══════════════════════════════════════════

pub fn insert_source(
    conn: &Connection,
    kind: &str,
    label: &str,
    confidence: i64,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO sources (type, label, confidence) VALUES (?1, ?2, ?3)",
        params![kind, label, confidence],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_or_create_source(
    conn: &Connection,
    kind: &str,
    label: &str,
    confidence: i64,
) -> Result<Source, DatabaseError> {
    let existing: Option<i64> = conn
        .query_row(
            "SELECT id FROM sources WHERE type = ?1 AND label = ?2 AND confidence = ?3
             ORDER BY id LIMIT 1",
            params![kind, label, confidence],
            |row| row.get(0),
        )
        .optional()?;
    let id = match existing {
        Some(id) => id,
        None => insert_source(conn, kind, label, confidence)?,
    };
    Ok(Source {
        id,
        kind: kind.to_string(),
        label: label.to_string(),
        confidence,
    })
}

pub fn list_sources(conn: &Connection) -> Result<Vec<Source>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT id, type, label, confidence FROM sources ORDER BY id")?;
    let rows = stmt.query_map([], |row| {
        Ok(Source {
            id: row.get(0)?,
            kind: row.get(1)?,
            label: row.get(2)?,
            confidence: row.get(3)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}
