//! HTTP endpoint tests against the in-memory backends

use actix_web::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_REQUEST_HEADERS,
    ACCESS_CONTROL_REQUEST_METHOD, AUTHORIZATION, CONTENT_DISPOSITION, CONTENT_LENGTH,
    CONTENT_TYPE, ORIGIN,
};
use actix_web::http::{Method, StatusCode};
use actix_web::{test, web, App};
use rental_backup::adapters::memory::{
    InMemoryObjectStore, InMemoryRecordSource, InMemorySessionVerifier,
};
use rental_backup::config::{ServerConfig, TablesConfig};
use rental_backup::core::export::{BucketMap, ExportCoordinator, ExportSettings};
use rental_backup::domain::{BucketName, Row};
use rental_backup::http::routes::{BACKUP_PATH, EXPORT_LEADS_PATH, HEALTH_PATH};
use rental_backup::http::{build_cors, routes, AdminGuard, AppState, ErrorResponse};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::watch;

const ADMIN_ORIGIN: &str = "https://admin.example.com";

fn rows(values: Vec<Value>) -> Vec<Row> {
    values
        .into_iter()
        .map(|v| match v {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        })
        .collect()
}

fn state(records: InMemoryRecordSource) -> AppState {
    let settings = ExportSettings {
        tables: TablesConfig::default(),
        buckets: BucketMap {
            leads: BucketName::new("lead-documents").unwrap(),
            users: BucketName::new("user-documents").unwrap(),
        },
        download_concurrency: 1,
        include_checksums: true,
    };
    // Receiver keeps reading the last value after the sender is dropped
    let (_tx, rx) = watch::channel(false);
    let store = InMemoryObjectStore::new().with_object("lead-documents", "c1/a.pdf", "PDF");
    AppState::new(ExportCoordinator::new(
        Arc::new(records),
        Arc::new(store),
        settings,
        rx,
    ))
}

fn records() -> InMemoryRecordSource {
    InMemoryRecordSource::new()
        .with_table(
            "contact_requests",
            rows(vec![json!({"id": "c1", "name": "Ana", "email": "ana@example.com"})]),
        )
        .with_table(
            "lead_documents",
            rows(vec![json!({
                "id": "d1",
                "contact_request_id": "c1",
                "document_type": "id_card",
                "file_name": "a.pdf",
                "file_path": "c1/a.pdf"
            })]),
        )
}

macro_rules! service {
    ($state:expr) => {
        test::init_service(
            App::new()
                .wrap(build_cors(&ServerConfig::default()))
                .app_data(web::Data::new($state))
                .configure(routes::configure),
        )
        .await
    };
}

#[actix_web::test]
async fn test_export_leads_returns_zip_attachment() {
    let app = service!(state(records()));

    let req = test::TestRequest::post()
        .uri(EXPORT_LEADS_PATH)
        .insert_header((ORIGIN, ADMIN_ORIGIN))
        .set_payload("{}")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get(CONTENT_TYPE).unwrap(), "application/zip");
    assert_eq!(resp.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), "*");

    let disposition = resp
        .headers()
        .get(CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment"));
    assert!(disposition.contains("leads_export_"));
    assert!(disposition.contains(".zip"));

    let length: usize = resp
        .headers()
        .get(CONTENT_LENGTH)
        .unwrap()
        .to_str()
        .unwrap()
        .parse()
        .unwrap();

    let body = test::read_body(resp).await;
    assert_eq!(body.len(), length);
    assert_eq!(&body[..2], b"PK");

    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(body.to_vec())).unwrap();
    assert!(archive.by_name("documents/leads/c1/id_card/a.pdf").is_ok());
    assert!(archive.by_name("export_info.json").is_ok());
}

#[actix_web::test]
async fn test_backup_accepts_empty_body() {
    let app = service!(state(records()));

    let req = test::TestRequest::post().uri(BACKUP_PATH).to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let disposition = resp.headers().get(CONTENT_DISPOSITION).unwrap();
    assert!(disposition.to_str().unwrap().contains("backup_"));
}

#[actix_web::test]
async fn test_malformed_body_is_error_json() {
    let app = service!(state(records()));

    let req = test::TestRequest::post()
        .uri(EXPORT_LEADS_PATH)
        .set_payload("{cutoff_date:")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.error, "Export failed");
    assert!(body.message.contains("Malformed request body"));
}

#[actix_web::test]
async fn test_fetch_failure_is_error_json() {
    let failing = InMemoryRecordSource::new().fail_table("contact_requests", "connection refused");
    let app = service!(state(failing));

    let req = test::TestRequest::post()
        .uri(BACKUP_PATH)
        .set_payload("{}")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Backup failed");
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("connection refused"));
}

#[actix_web::test]
async fn test_preflight_allows_admin_front_end() {
    let app = service!(state(records()));

    let req = test::TestRequest::default()
        .method(Method::OPTIONS)
        .uri(EXPORT_LEADS_PATH)
        .insert_header((ORIGIN, ADMIN_ORIGIN))
        .insert_header((ACCESS_CONTROL_REQUEST_METHOD, "POST"))
        .insert_header((ACCESS_CONTROL_REQUEST_HEADERS, "authorization, content-type"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert!(resp.status().is_success());
    assert_eq!(resp.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), "*");
    let allowed = resp
        .headers()
        .get(ACCESS_CONTROL_ALLOW_HEADERS)
        .unwrap()
        .to_str()
        .unwrap()
        .to_lowercase();
    assert!(allowed.contains("authorization"));
    assert!(allowed.contains("content-type"));
}

#[actix_web::test]
async fn test_guard_requires_admin_session() {
    let verifier = InMemorySessionVerifier::new().with_session("admin-token", "admin");
    let guarded = state(records()).with_guard(AdminGuard::new(
        Arc::new(verifier),
        vec!["admin".to_string()],
    ));
    let app = service!(guarded);

    let req = test::TestRequest::post().uri(EXPORT_LEADS_PATH).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.error, "Unauthorized");

    let req = test::TestRequest::post()
        .uri(EXPORT_LEADS_PATH)
        .insert_header((AUTHORIZATION, "Bearer admin-token"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_health() {
    let app = service!(state(InMemoryRecordSource::new()));

    let req = test::TestRequest::get().uri(HEALTH_PATH).to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
}
