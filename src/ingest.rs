//! Ingestion boundary: converts loosely-shaped prescription JSON from a
//! record service into validated `PrescriptionRecord`s.
//!
//! Optional or malformed provenance and facility data degrade to defaults
//! here, so the engine never sees a half-formed record. Records missing an
//! id, a patient, a medication name or a parseable start date are skipped
//! with a warning instead of failing the batch.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::models::enums::PrescriptionStatus;
use crate::models::{EntityRef, PrescriptionRecord, SourceProvenance};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Keeps a field only when its JSON value has the expected shape; anything
/// else (wrong type, `null`) reads as absent instead of failing the record.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// A nested `{id, name}` object as sent by the record service.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WireEntity {
    #[serde(deserialize_with = "lenient")]
    pub id: Option<i64>,
    #[serde(deserialize_with = "lenient")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WireSource {
    #[serde(rename = "type", deserialize_with = "lenient")]
    pub kind: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub label: Option<String>,
    pub confidence: Option<Value>,
}

/// One prescription exactly as received. Every field is optional, and a
/// field of the wrong JSON type is treated as missing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WirePrescription {
    #[serde(deserialize_with = "lenient")]
    pub id: Option<i64>,
    #[serde(deserialize_with = "lenient")]
    pub patient: Option<WireEntity>,
    #[serde(deserialize_with = "lenient")]
    pub medication: Option<WireEntity>,
    #[serde(deserialize_with = "lenient")]
    pub facility: Option<WireEntity>,
    #[serde(deserialize_with = "lenient")]
    pub dose: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub start_date: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub end_date: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub status: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub source: Option<WireSource>,
}

/// Why a wire record could not become a `PrescriptionRecord`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IngestIssue {
    #[error("record has no id")]
    MissingId,
    #[error("record {0} has no patient id")]
    MissingPatient(i64),
    #[error("record {0} has no medication name")]
    MissingMedication(i64),
    #[error("record {id} has an invalid start date: {value:?}")]
    InvalidStartDate { id: i64, value: Option<String> },
}

impl WirePrescription {
    pub fn into_record(self) -> Result<PrescriptionRecord, IngestIssue> {
        let id = self.id.ok_or(IngestIssue::MissingId)?;

        let patient = self
            .patient
            .and_then(|p| Some(EntityRef::new(p.id?, p.name.unwrap_or_default())))
            .ok_or(IngestIssue::MissingPatient(id))?;

        let medication = self
            .medication
            .and_then(|m| {
                let name = m.name.filter(|n| !n.is_empty())?;
                Some(EntityRef::new(m.id.unwrap_or_default(), name))
            })
            .ok_or(IngestIssue::MissingMedication(id))?;

        let start_date = self
            .start_date
            .as_deref()
            .and_then(parse_date)
            .ok_or_else(|| IngestIssue::InvalidStartDate {
                id,
                value: self.start_date.clone(),
            })?;

        let end_date = match self.end_date.as_deref() {
            None | Some("") => None,
            Some(raw) => {
                let parsed = parse_date(raw);
                if parsed.is_none() {
                    tracing::warn!(record_id = id, value = raw, "Unparseable end date, treating as ongoing");
                }
                parsed
            }
        };

        let facility = self
            .facility
            .and_then(|f| Some(EntityRef::new(f.id?, f.name.unwrap_or_default())));

        let status = self
            .status
            .as_deref()
            .map(PrescriptionStatus::parse_lenient)
            .unwrap_or(PrescriptionStatus::Unknown);

        Ok(PrescriptionRecord {
            id,
            patient,
            medication,
            facility,
            dose: self.dose.unwrap_or_default(),
            start_date,
            end_date,
            status,
            source: self.source.map(WireSource::into_provenance),
        })
    }
}

impl WireSource {
    fn into_provenance(self) -> SourceProvenance {
        SourceProvenance {
            kind: self.kind.unwrap_or_default(),
            label: self.label.unwrap_or_default(),
            confidence: coerce_confidence(self.confidence.as_ref()),
        }
    }
}

/// Numeric JSON values pass through; anything else becomes 0.
pub fn coerce_confidence(value: Option<&Value>) -> f64 {
    value
        .and_then(Value::as_f64)
        .filter(|c| c.is_finite())
        .unwrap_or(0.0)
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

/// Converts a batch, dropping (and logging) records that cannot be used.
pub fn ingest(batch: Vec<WirePrescription>) -> Vec<PrescriptionRecord> {
    let received = batch.len();
    let records: Vec<PrescriptionRecord> = batch
        .into_iter()
        .filter_map(|wire| match wire.into_record() {
            Ok(record) => Some(record),
            Err(issue) => {
                tracing::warn!(%issue, "Skipping malformed prescription record");
                None
            }
        })
        .collect();

    if records.len() != received {
        tracing::debug!(received, kept = records.len(), "Ingested prescription batch");
    }
    records
}

/// Parses a JSON array of prescriptions. Elements that are not objects are
/// skipped like any other malformed record.
pub fn ingest_json(body: &[u8]) -> Result<Vec<PrescriptionRecord>, serde_json::Error> {
    let values: Vec<Value> = serde_json::from_slice(body)?;
    Ok(ingest_values(values))
}

/// Same as [`ingest_json`] for an already-parsed array.
pub fn ingest_values(values: Vec<Value>) -> Vec<PrescriptionRecord> {
    let batch = values
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<WirePrescription>(value) {
            Ok(wire) => Some(wire),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping undecodable prescription record");
                None
            }
        })
        .collect();
    ingest(batch)
}
