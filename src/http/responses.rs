//! Response bodies and archive responses

use crate::core::export::ExportArchive;
use crate::domain::BackupError;
use actix_web::http::header::{self, ContentDisposition, DispositionParam, DispositionType};
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde::{Deserialize, Serialize};

/// JSON error body: `{ "error": ..., "message": ... }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}

/// Status code for an export failure
///
/// Guard rejections are 401; every other failure is 500.
pub fn status_for(error: &BackupError) -> StatusCode {
    match error {
        BackupError::Authentication(_) => StatusCode::UNAUTHORIZED,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn error_response(label: &str, error: &BackupError) -> HttpResponse {
    HttpResponse::build(status_for(error)).json(ErrorResponse::new(label, error.to_string()))
}

/// 200 response carrying the archive as an attachment
pub fn archive_response(archive: ExportArchive) -> HttpResponse {
    let disposition = ContentDisposition {
        disposition: DispositionType::Attachment,
        parameters: vec![DispositionParam::Filename(archive.filename.clone())],
    };

    HttpResponse::Ok()
        .content_type("application/zip")
        .insert_header(disposition)
        .insert_header((header::CONTENT_LENGTH, archive.len()))
        .body(archive.bytes)
}
