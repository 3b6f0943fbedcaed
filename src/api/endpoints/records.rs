//! Read-only listings. Patients come from the configured record source, so
//! their ids match what the timeline queries; the rest read the local store.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, RecordQuery};
use crate::db;
use crate::models::{Facility, Medication, Patient, PrescriptionRecord, Source};

/// `GET /api/patients/`
pub async fn patients(State(ctx): State<ApiContext>) -> Result<Json<Vec<Patient>>, ApiError> {
    let source = Arc::clone(&ctx.source);
    let patients = tokio::task::spawn_blocking(move || source.patients()).await??;
    Ok(Json(patients))
}

/// `GET /api/medications/`
pub async fn medications(
    State(ctx): State<ApiContext>,
) -> Result<Json<Vec<Medication>>, ApiError> {
    Ok(Json(ctx.with_store(db::list_medications).await?))
}

/// `GET /api/facilities/`
pub async fn facilities(State(ctx): State<ApiContext>) -> Result<Json<Vec<Facility>>, ApiError> {
    Ok(Json(ctx.with_store(db::list_facilities).await?))
}

/// `GET /api/sources/`
pub async fn sources(State(ctx): State<ApiContext>) -> Result<Json<Vec<Source>>, ApiError> {
    Ok(Json(ctx.with_store(db::list_sources).await?))
}

/// `GET /api/prescriptions/?patient_id=&status=&start=&end=`
///
/// `start`/`end` only narrow the result when both are given.
pub async fn prescriptions(
    State(ctx): State<ApiContext>,
    Query(query): Query<RecordQuery>,
) -> Result<Json<Vec<PrescriptionRecord>>, ApiError> {
    let parsed = query.parse()?;
    if parsed.matches_nothing {
        return Ok(Json(Vec::new()));
    }

    let filter = parsed.filter;
    let records = ctx
        .with_store(move |conn| db::list_prescriptions(conn, &filter))
        .await?;
    Ok(Json(records))
}
