//! Route table

use super::handlers;
use actix_web::web;

pub const BACKUP_PATH: &str = "/functions/v1/backup";
pub const EXPORT_LEADS_PATH: &str = "/functions/v1/export-leads";
pub const HEALTH_PATH: &str = "/health";

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route(BACKUP_PATH, web::post().to(handlers::backup))
        .route(EXPORT_LEADS_PATH, web::post().to(handlers::export_leads))
        .route(HEALTH_PATH, web::get().to(handlers::health));
}
