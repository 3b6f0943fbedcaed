//! Record sources: where prescription snapshots come from.
//!
//! The reconciliation engine never fetches anything itself. Callers pull a
//! snapshot through a [`RecordSource`] and hand it to
//! [`crate::reconcile::reconcile`].

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::db::{self, DatabaseError};
use crate::ingest;
use crate::models::{Patient, PrescriptionFilter, PrescriptionRecord};

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Cannot connect to record service at {0}")]
    Connection(String),

    #[error("Record service timed out after {0}s")]
    Timeout(u64),

    #[error("Record service returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Cannot decode record service response: {0}")]
    Decode(String),

    #[error("Record store error: {0}")]
    Database(#[from] DatabaseError),
}

/// Read-only access to patients and their prescriptions.
pub trait RecordSource: Send + Sync {
    fn patients(&self) -> Result<Vec<Patient>, SourceError>;

    fn prescriptions(
        &self,
        filter: &PrescriptionFilter,
    ) -> Result<Vec<PrescriptionRecord>, SourceError>;
}

/// Fetch prescriptions, degrading any failure to an empty snapshot.
pub fn fetch_or_empty(source: &dyn RecordSource, filter: &PrescriptionFilter) -> Vec<PrescriptionRecord> {
    match source.prescriptions(filter) {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!(error = %e, patient_id = ?filter.patient_id, "Prescription fetch failed, using empty snapshot");
            Vec::new()
        }
    }
}

// ═══════════════════════════════════════════
// Local SQLite store
// ═══════════════════════════════════════════

/// Serves records from the local SQLite store. A connection is opened per
/// call; nothing is shared between requests.
pub struct SqliteRecordSource {
    db_path: PathBuf,
}

impl SqliteRecordSource {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }
}

impl RecordSource for SqliteRecordSource {
    fn patients(&self) -> Result<Vec<Patient>, SourceError> {
        let conn = db::open_database(&self.db_path)?;
        Ok(db::list_patients(&conn)?)
    }

    fn prescriptions(
        &self,
        filter: &PrescriptionFilter,
    ) -> Result<Vec<PrescriptionRecord>, SourceError> {
        let conn = db::open_database(&self.db_path)?;
        Ok(db::list_prescriptions(&conn, filter)?)
    }
}

// ═══════════════════════════════════════════
// External record service
// ═══════════════════════════════════════════

/// Blocking HTTP client for an external record service exposing
/// `/api/patients/` and `/api/prescriptions/`.
pub struct HttpRecordSource {
    base_url: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl HttpRecordSource {
    /// Must be called outside an async context; the blocking client owns
    /// its own runtime.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, SourceError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| SourceError::Connection(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn map_send_error(&self, e: reqwest::Error) -> SourceError {
        if e.is_timeout() {
            SourceError::Timeout(self.timeout_secs)
        } else if e.is_connect() {
            SourceError::Connection(self.base_url.clone())
        } else {
            SourceError::Decode(e.to_string())
        }
    }

    fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Vec<u8>, SourceError> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(SourceError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().map_err(|e| self.map_send_error(e))?;
        Ok(bytes.to_vec())
    }
}

/// Query pairs for `/api/prescriptions/`; absent fields are omitted.
fn filter_query(filter: &PrescriptionFilter) -> Vec<(&'static str, String)> {
    let mut query = Vec::new();
    if let Some(patient_id) = filter.patient_id {
        query.push(("patient_id", patient_id.to_string()));
    }
    if let Some(status) = filter.status {
        query.push(("status", status.as_str().to_string()));
    }
    if let Some((start, end)) = filter.window() {
        query.push(("start", start.to_string()));
        query.push(("end", end.to_string()));
    }
    query
}

impl RecordSource for HttpRecordSource {
    fn patients(&self) -> Result<Vec<Patient>, SourceError> {
        let body = self.get("/api/patients/", &[])?;
        serde_json::from_slice(&body).map_err(|e| SourceError::Decode(e.to_string()))
    }

    fn prescriptions(
        &self,
        filter: &PrescriptionFilter,
    ) -> Result<Vec<PrescriptionRecord>, SourceError> {
        let body = self.get("/api/prescriptions/", &filter_query(filter))?;
        ingest::ingest_json(&body).map_err(|e| SourceError::Decode(e.to_string()))
    }
}
