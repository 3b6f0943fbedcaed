//! HTTP router.
//!
//! Returns a composable `Router` with every route under `/api/`.
//! Listing paths keep their trailing slash so a running instance can act as
//! the upstream record service of another.

use axum::http::Method;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::api::endpoints;
use crate::api::types::ApiContext;

/// Build the API router. Handlers use `State<ApiContext>`.
pub fn api_router(ctx: ApiContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    let routes = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/patients/", get(endpoints::records::patients))
        .route("/medications/", get(endpoints::records::medications))
        .route("/facilities/", get(endpoints::records::facilities))
        .route("/sources/", get(endpoints::records::sources))
        .route("/prescriptions/", get(endpoints::records::prescriptions))
        .route("/timeline/", get(endpoints::timeline::timeline))
        .route("/reconcile", post(endpoints::timeline::reconcile_snapshot))
        .with_state(ctx);

    Router::new().nest("/api", routes).layer(cors)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::db;
    use crate::models::{Patient, PrescriptionFilter, PrescriptionRecord};
    use crate::source::{RecordSource, SourceError, SqliteRecordSource};

    /// Seeded store in a temp dir. The guard must outlive the router.
    fn seeded_ctx() -> (ApiContext, tempfile::TempDir) {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("records.db");
        let conn = db::open_database(&path).unwrap();
        db::seed::seed_demo_data(&conn).unwrap();
        drop(conn);

        let source = Arc::new(SqliteRecordSource::new(&path));
        (ApiContext::new(source, path), tmp)
    }

    struct DownSource;

    impl RecordSource for DownSource {
        fn patients(&self) -> Result<Vec<Patient>, SourceError> {
            Err(SourceError::Timeout(10))
        }

        fn prescriptions(
            &self,
            _filter: &PrescriptionFilter,
        ) -> Result<Vec<PrescriptionRecord>, SourceError> {
            Err(SourceError::Timeout(10))
        }
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("Content-Type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    async fn patient_id(ctx: &ApiContext, name: &str) -> i64 {
        let (_, patients) = get_json(api_router(ctx.clone()), "/api/patients/").await;
        patients
            .as_array()
            .unwrap()
            .iter()
            .find(|p| p["name"] == name)
            .unwrap()["id"]
            .as_i64()
            .unwrap()
    }

    #[tokio::test]
    async fn health_reports_version() {
        let (ctx, _tmp) = seeded_ctx();
        let (status, json) = get_json(api_router(ctx), "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["version"], crate::config::APP_VERSION);
    }

    #[tokio::test]
    async fn reference_listings() {
        let (ctx, _tmp) = seeded_ctx();
        let (_, patients) = get_json(api_router(ctx.clone()), "/api/patients/").await;
        assert_eq!(patients.as_array().unwrap().len(), 3);

        let (_, medications) = get_json(api_router(ctx.clone()), "/api/medications/").await;
        assert_eq!(medications[0]["name"], "Aspirin");

        let (_, facilities) = get_json(api_router(ctx.clone()), "/api/facilities/").await;
        assert_eq!(facilities.as_array().unwrap().len(), 4);
        assert_eq!(facilities[2]["type"], "pharmacy");

        let (_, sources) = get_json(api_router(ctx), "/api/sources/").await;
        assert_eq!(sources[0]["type"], "ehr");
        assert_eq!(sources[1]["confidence"], 4);
    }

    #[tokio::test]
    async fn prescriptions_nested_shape() {
        let (ctx, _tmp) = seeded_ctx();
        let (status, json) = get_json(api_router(ctx), "/api/prescriptions/").await;
        assert_eq!(status, StatusCode::OK);

        let records = json.as_array().unwrap();
        assert_eq!(records.len(), 5);
        let first = &records[0];
        assert!(first["patient"]["name"].is_string());
        assert!(first["medication"]["id"].is_i64());
        assert!(first["facility"]["name"].is_string());
        assert!(first["source"]["type"].is_string());
        assert!(first["source"]["label"].is_string());

        // Newest start first
        let starts: Vec<&str> = records.iter().map(|r| r["start_date"].as_str().unwrap()).collect();
        let mut sorted = starts.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(starts, sorted);
    }

    #[tokio::test]
    async fn prescriptions_filtered() {
        let (ctx, _tmp) = seeded_ctx();
        let alice = patient_id(&ctx, "Alice Smith").await;

        let uri = format!("/api/prescriptions/?patient_id={alice}&status=active");
        let (_, json) = get_json(api_router(ctx.clone()), &uri).await;
        let records = json.as_array().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["facility"]["name"], "Y Clinic");

        // Window overlapping only the first Alice prescription
        let uri = format!("/api/prescriptions/?patient_id={alice}&start=2025-12-01&end=2026-01-05");
        let (_, json) = get_json(api_router(ctx.clone()), &uri).await;
        assert_eq!(json.as_array().unwrap().len(), 1);
        assert_eq!(json[0]["status"], "stopped");

        let (_, json) = get_json(api_router(ctx), "/api/prescriptions/?status=paused").await;
        assert!(json.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn invalid_date_is_400() {
        let (ctx, _tmp) = seeded_ctx();
        let (status, json) = get_json(api_router(ctx), "/api/prescriptions/?start=yesterday").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn timeline_flags_facility_conflict() {
        let (ctx, _tmp) = seeded_ctx();
        let alice = patient_id(&ctx, "Alice Smith").await;

        let (status, json) =
            get_json(api_router(ctx), &format!("/api/timeline/?patient_id={alice}")).await;
        assert_eq!(status, StatusCode::OK);

        let records = json["records"].as_array().unwrap();
        assert_eq!(records.len(), 2);
        // Recency order: the clinic record ends later
        assert_eq!(records[0]["facility"]["name"], "Y Clinic");
        assert_eq!(records[0]["priority"], 24.0);
        assert_eq!(records[0]["priority_level"], "medium");
        // Only one active member, so no conflict flags
        assert!(records[0]["edge_cases"].as_array().unwrap().is_empty());
        assert_eq!(records[1]["priority"], 35.0);
        assert_eq!(records[1]["priority_level"], "high");
        assert_eq!(json["summary"]["total"], 2);
        assert_eq!(json["summary"]["active"], 1);
    }

    #[tokio::test]
    async fn timeline_applies_range_bounds() {
        let (ctx, _tmp) = seeded_ctx();
        let charlie = patient_id(&ctx, "Charlie Brown").await;

        let uri = format!("/api/timeline/?patient_id={charlie}&end=2026-01-31");
        let (_, json) = get_json(api_router(ctx), &uri).await;
        // The ongoing 1000mg record has no end date and is dropped by an end bound
        let records = json["records"].as_array().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["dose"], "500mg");
    }

    #[tokio::test]
    async fn timeline_degrades_when_source_down() {
        let (ctx, _tmp) = seeded_ctx();
        let ctx = ApiContext::new(Arc::new(DownSource), ctx.store_path.clone());

        let (status, json) = get_json(api_router(ctx), "/api/timeline/?patient_id=1").await;
        assert_eq!(status, StatusCode::OK);
        assert!(json["records"].as_array().unwrap().is_empty());
        assert_eq!(json["summary"]["total"], 0);
    }

    #[tokio::test]
    async fn reconcile_snapshot_flags_conflicts() {
        let (ctx, _tmp) = seeded_ctx();
        let body = json!({
            "records": [
                {
                    "id": 1,
                    "patient": {"id": 1, "name": "Alice Smith"},
                    "medication": {"id": 1, "name": "Aspirin"},
                    "facility": {"id": 1, "name": "X Hospital"},
                    "dose": "100mg",
                    "start_date": "2026-01-01",
                    "status": "active",
                    "source": {"type": "ehr", "label": "EHR System", "confidence": 5}
                },
                {
                    "id": 2,
                    "patient": {"id": 1, "name": "Alice Smith"},
                    "medication": {"id": 1, "name": "Aspirin"},
                    "facility": {"id": 2, "name": "Y Clinic"},
                    "dose": "200mg",
                    "start_date": "2026-01-05",
                    "status": "active",
                    "source": {"type": "manual", "label": "Manual Entry", "confidence": 4}
                },
                {"id": 3, "dose": "no patient"}
            ]
        });

        let (status, json) = post_json(api_router(ctx), "/api/reconcile", body).await;
        assert_eq!(status, StatusCode::OK);

        let records = json["records"].as_array().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["id"], 2);
        assert_eq!(
            records[0]["edge_cases"],
            json!(["Different facilities", "Dose changed", "Lower priority/conflicting"])
        );
        assert_eq!(
            records[1]["edge_cases"],
            json!(["Different facilities", "Dose changed"])
        );
        assert_eq!(json["summary"]["flagged"], 2);
        assert_eq!(json["by_medication"][0]["medication_name"], "Aspirin");
    }

    #[tokio::test]
    async fn reconcile_rejects_bad_bound() {
        let (ctx, _tmp) = seeded_ctx();
        let body = json!({"records": [], "start_date": "01-01-2026"});
        let (status, _) = post_json(api_router(ctx), "/api/reconcile", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn reconcile_malformed_body_is_json_400() {
        let (ctx, _tmp) = seeded_ctx();
        let response = api_router(ctx)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/reconcile")
                    .header("Content-Type", "application/json")
                    .body(Body::from("{\"records\": [1, 2"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
        assert!(json["error"]["message"].is_string());
    }

    #[tokio::test]
    async fn reconcile_without_content_type_is_json_400() {
        let (ctx, _tmp) = seeded_ctx();
        let response = api_router(ctx)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/reconcile")
                    .body(Body::from("{\"records\": []}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn patients_follow_record_source() {
        let (ctx, _tmp) = seeded_ctx();
        let ctx = ApiContext::new(Arc::new(DownSource), ctx.store_path.clone());

        let (status, json) = get_json(api_router(ctx), "/api/patients/").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(json["error"]["code"], "UPSTREAM_UNAVAILABLE");
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let (ctx, _tmp) = seeded_ctx();
        let response = api_router(ctx)
            .oneshot(Request::builder().uri("/nonexistent").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
