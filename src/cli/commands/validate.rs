//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the rental-backup configuration file.

use crate::adapters::postgresql::client::redact_connection_string;
use crate::config::load_config;
use clap::Args;
use secrecy::ExposeSecret;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates after substitution and overrides
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                println!();
                return Ok(2);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Environment: {:?}", config.environment);
        println!("  Log Level: {}", config.application.log_level);
        println!("  Bind: {}:{}", config.server.host, config.server.port);
        println!(
            "  Admin Session Required: {}",
            config.server.require_admin_session
        );
        println!(
            "  Database: {}",
            redact_connection_string(config.database.connection_string.expose_secret().as_ref())
        );
        println!("  Max Connections: {}", config.database.max_connections);
        println!("  Storage: {}", config.storage.base_url);
        println!("  Lead Bucket: {}", config.storage.lead_bucket);
        println!("  User Bucket: {}", config.storage.user_bucket);
        println!(
            "  Download Concurrency: {}",
            config.export.download_concurrency
        );
        println!();
        Ok(0)
    }
}
