//! Shared state and query types for the HTTP surface.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::db::{self, DatabaseError};
use crate::models::enums::PrescriptionStatus;
use crate::models::PrescriptionFilter;
use crate::source::RecordSource;

/// Handler state. Cheap to clone; holds no open connections.
#[derive(Clone)]
pub struct ApiContext {
    /// Where the timeline fetches its snapshot from.
    pub source: Arc<dyn RecordSource>,
    /// Local record store backing the listing endpoints.
    pub store_path: PathBuf,
}

impl ApiContext {
    pub fn new(source: Arc<dyn RecordSource>, store_path: PathBuf) -> Self {
        Self { source, store_path }
    }

    /// Run a closure against a fresh store connection on the blocking pool.
    pub async fn with_store<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, DatabaseError> + Send + 'static,
    {
        let path = self.store_path.clone();
        let result = tokio::task::spawn_blocking(move || -> Result<T, DatabaseError> {
            let conn = db::open_database(&path)?;
            f(&conn)
        })
        .await?;
        Ok(result?)
    }
}

/// `?patient_id=&status=&start=&end=` as received. Empty values count as absent.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RecordQuery {
    pub patient_id: Option<String>,
    pub status: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

/// Validated form of [`RecordQuery`].
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedQuery {
    pub filter: PrescriptionFilter,
    /// A status was given that no record can have; the answer is empty.
    pub matches_nothing: bool,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Parse an ISO `YYYY-MM-DD` date parameter.
pub fn parse_date_param(name: &str, value: &Option<String>) -> Result<Option<NaiveDate>, ApiError> {
    non_empty(value)
        .map(|raw| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
                ApiError::BadRequest(format!("Invalid {name}: {raw:?}, expected YYYY-MM-DD"))
            })
        })
        .transpose()
}

impl RecordQuery {
    pub fn parse(&self) -> Result<ParsedQuery, ApiError> {
        let patient_id = non_empty(&self.patient_id)
            .map(|raw| {
                raw.parse::<i64>()
                    .map_err(|_| ApiError::BadRequest(format!("Invalid patient_id: {raw:?}")))
            })
            .transpose()?;

        let mut matches_nothing = false;
        let status = match non_empty(&self.status) {
            None => None,
            Some(raw) => match raw.to_lowercase().parse::<PrescriptionStatus>() {
                Ok(status) => Some(status),
                Err(_) => {
                    matches_nothing = true;
                    None
                }
            },
        };

        Ok(ParsedQuery {
            filter: PrescriptionFilter {
                patient_id,
                status,
                start: parse_date_param("start", &self.start)?,
                end: parse_date_param("end", &self.end)?,
            },
            matches_nothing,
        })
    }
}
