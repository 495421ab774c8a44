//! HTTP surface
//!
//! Two POST endpoints return export archives as ZIP attachments:
//!
//! - `POST /functions/v1/backup` - full backup
//! - `POST /functions/v1/export-leads` - leads export
//!
//! plus `GET /health`. CORS is permissive for the admin front end; failures
//! are JSON `{ "error", "message" }` bodies.

pub mod auth;
pub mod handlers;
pub mod responses;
pub mod routes;

use crate::config::ServerConfig;
use crate::core::export::ExportCoordinator;
use actix_cors::Cors;
use actix_web::http::header::{self, HeaderName};
use actix_web::{web, App, HttpServer};
use tokio::sync::watch;

pub use auth::AdminGuard;
pub use responses::ErrorResponse;

/// Shared state of every worker
#[derive(Clone)]
pub struct AppState {
    pub coordinator: ExportCoordinator,
    /// Present when admin sessions are required
    pub guard: Option<AdminGuard>,
}

impl AppState {
    pub fn new(coordinator: ExportCoordinator) -> Self {
        Self {
            coordinator,
            guard: None,
        }
    }

    pub fn with_guard(mut self, guard: AdminGuard) -> Self {
        self.guard = Some(guard);
        self
    }
}

/// CORS policy for the export endpoints
pub fn build_cors(config: &ServerConfig) -> Cors {
    let mut cors = Cors::default();

    if config.allows_any_origin() {
        cors = cors.allow_any_origin().send_wildcard();
    } else {
        for origin in &config.allowed_origins {
            cors = cors.allowed_origin(origin);
        }
    }

    cors.allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
        ])
        .expose_headers(vec![header::CONTENT_DISPOSITION, header::CONTENT_LENGTH])
        .max_age(3600)
}

/// Bind and run the server until `shutdown` flips to `true`
///
/// # Errors
///
/// Returns the I/O error if binding or serving fails.
pub async fn serve(
    config: &ServerConfig,
    state: AppState,
    mut shutdown: watch::Receiver<bool>,
) -> std::io::Result<()> {
    let bind_addr = format!("{}:{}", config.host, config.port);
    let data = web::Data::new(state);
    let cors_config = config.clone();

    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(build_cors(&cors_config))
            .app_data(data.clone())
            .configure(routes::configure)
    })
    .disable_signals()
    .bind(&bind_addr)?;

    if let Some(workers) = config.workers {
        server = server.workers(workers);
    }

    tracing::info!(bind = %bind_addr, "Starting HTTP server");
    let server = server.run();
    let handle = server.handle();

    tokio::spawn(async move {
        while shutdown.changed().await.is_ok() {
            if *shutdown.borrow() {
                tracing::info!("Stopping HTTP server");
                handle.stop(true).await;
                break;
            }
        }
    });

    server.await
}
