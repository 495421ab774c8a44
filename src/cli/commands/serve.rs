//! Serve command implementation
//!
//! Runs the HTTP export service until a shutdown signal arrives.

use super::build_coordinator;
use crate::config::load_config;
use crate::http::{self, AdminGuard, AppState};
use clap::Args;
use tokio::sync::watch;

/// Arguments for the serve command
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Override the bind address
    #[arg(long)]
    pub host: Option<String>,

    /// Override the bind port
    #[arg(short, long)]
    pub port: Option<u16>,
}

impl ServeArgs {
    /// Execute the serve command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting serve command");

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Configuration error: {e}");
                return Ok(2);
            }
        };

        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }

        let (coordinator, backends) = match build_coordinator(&config, shutdown_signal.clone()) {
            Ok(parts) => parts,
            Err(e) => {
                tracing::error!(error = %e, "Failed to initialize backends");
                eprintln!("Failed to initialize backends: {e}");
                return Ok(4);
            }
        };

        if let Err(e) = backends.records.test_connection().await {
            tracing::warn!(error = %e, "Database connectivity check failed");
        }

        let mut state = AppState::new(coordinator);
        if let Some(verifier) = backends.sessions {
            state = state.with_guard(AdminGuard::new(
                verifier,
                config.server.admin_roles.clone(),
            ));
        }

        println!(
            "🚀 Serving exports on http://{}:{}",
            config.server.host, config.server.port
        );

        match http::serve(&config.server, state, shutdown_signal).await {
            Ok(()) => {
                tracing::info!("HTTP server stopped");
                Ok(0)
            }
            Err(e) => {
                tracing::error!(error = %e, "HTTP server failed");
                eprintln!("Server error: {e}");
                Ok(5)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_serve_missing_config_is_configuration_error() {
        let args = ServeArgs {
            host: None,
            port: None,
        };
        let (_tx, rx) = watch::channel(false);
        let code = args
            .execute("/nonexistent/rental-backup.toml", rx)
            .await
            .unwrap();
        assert_eq!(code, 2);
    }
}
