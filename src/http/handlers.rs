//! Request handlers

use super::responses::{archive_response, error_response};
use super::AppState;
use crate::domain::{BackupError, ExportKind, ExportRequest};
use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;

/// POST /functions/v1/backup
pub async fn backup(req: HttpRequest, body: web::Bytes, state: web::Data<AppState>) -> HttpResponse {
    run_export(&req, &body, &state, ExportKind::FullBackup).await
}

/// POST /functions/v1/export-leads
pub async fn export_leads(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<AppState>,
) -> HttpResponse {
    run_export(&req, &body, &state, ExportKind::LeadsExport).await
}

/// GET /health
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

fn failure_label(kind: ExportKind) -> &'static str {
    match kind {
        ExportKind::FullBackup => "Backup failed",
        ExportKind::LeadsExport => "Export failed",
    }
}

async fn run_export(
    req: &HttpRequest,
    body: &[u8],
    state: &AppState,
    kind: ExportKind,
) -> HttpResponse {
    if let Some(guard) = &state.guard {
        if let Err(e) = guard.authorize(req).await {
            tracing::warn!(export_kind = %kind, error = %e, "Export request rejected");
            let label = match e {
                BackupError::Authentication(_) => "Unauthorized",
                _ => failure_label(kind),
            };
            return error_response(label, &e);
        }
    }

    let request = match ExportRequest::from_body(body) {
        Ok(request) => request,
        Err(e) => {
            let error = BackupError::InvalidRequest(format!("Malformed request body: {e}"));
            tracing::warn!(export_kind = %kind, error = %error, "Export request rejected");
            return error_response(failure_label(kind), &error);
        }
    };

    match state.coordinator.run(kind, request).await {
        Ok(archive) => archive_response(archive),
        Err(e) => error_response(failure_label(kind), &e),
    }
}
