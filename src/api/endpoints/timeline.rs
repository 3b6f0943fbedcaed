//! Reconciled timeline endpoints.
//!
//! `GET /api/timeline/` fetches a patient's snapshot from the configured
//! record source; `POST /api/reconcile` takes the snapshot in the body.
//! Both hand it to the engine unchanged.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use crate::api::error::ApiError;
use crate::api::types::{parse_date_param, ApiContext, RecordQuery};
use crate::ingest;
use crate::models::PrescriptionFilter;
use crate::reconcile::{reconcile, ReconcileParams, ReconciliationResult};
use crate::source::fetch_or_empty;

/// `GET /api/timeline/?patient_id=&status=&start=&end=`
///
/// The source is queried by patient and status only. `start` and `end`
/// become the engine's range bounds, each applied on its own.
pub async fn timeline(
    State(ctx): State<ApiContext>,
    Query(query): Query<RecordQuery>,
) -> Result<Json<ReconciliationResult>, ApiError> {
    let parsed = query.parse()?;
    let params = ReconcileParams {
        start_date: parsed.filter.start,
        end_date: parsed.filter.end,
    };

    let records = if parsed.matches_nothing {
        Vec::new()
    } else {
        let fetch = PrescriptionFilter {
            patient_id: parsed.filter.patient_id,
            status: parsed.filter.status,
            start: None,
            end: None,
        };
        let source = Arc::clone(&ctx.source);
        tokio::task::spawn_blocking(move || fetch_or_empty(source.as_ref(), &fetch)).await?
    };

    Ok(Json(reconcile(&records, &params)))
}

#[derive(Debug, Deserialize)]
pub struct ReconcileRequest {
    #[serde(default)]
    pub records: Vec<Value>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

/// `POST /api/reconcile`: run the engine over a caller-supplied snapshot.
pub async fn reconcile_snapshot(
    payload: Result<Json<ReconcileRequest>, JsonRejection>,
) -> Result<Json<ReconciliationResult>, ApiError> {
    let Json(request) = payload?;
    let params = ReconcileParams {
        start_date: parse_date_param("start_date", &request.start_date)?,
        end_date: parse_date_param("end_date", &request.end_date)?,
    };
    let records = ingest::ingest_values(request.records);
    Ok(Json(reconcile(&records, &params)))
}
