//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "rental-backup.toml")]
    pub output: String,

    /// Include every option with comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing rental-backup configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        let config_content = if self.with_examples {
            generate_config_with_examples()
        } else {
            generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Set RB_DATABASE_URL and RB_STORAGE_SERVICE_KEY (or use a .env file)");
                println!("  3. Validate configuration: rental-backup validate-config");
                println!("  4. Start the service: rental-backup serve");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5)
            }
        }
    }
}

/// Minimal configuration: only the required sections
pub fn generate_minimal_config() -> String {
    r#"# rental-backup configuration

environment = "development"

[application]
log_level = "info"

[server]
host = "0.0.0.0"
port = 8080

[database]
connection_string = "${RB_DATABASE_URL}"

[storage]
base_url = "https://your-project.example.co"
service_key = "${RB_STORAGE_SERVICE_KEY}"
"#
    .to_string()
}

/// Full configuration with every option and its default
pub fn generate_config_with_examples() -> String {
    r#"# rental-backup configuration
#
# Values of the form ${VAR} are read from the environment. Any option can
# also be overridden with an RB_<SECTION>_<KEY> variable, for example
# RB_SERVER_PORT=9000.

# development | staging | production
environment = "development"

[application]
# trace, debug, info, warn, error
log_level = "info"

[server]
host = "0.0.0.0"
port = 8080
# workers = 4

# "*" allows any origin
allowed_origins = ["*"]

# Require a bearer token matching a row in session_table
require_admin_session = false
admin_roles = ["admin"]
session_table = "admin_sessions"

[database]
connection_string = "${RB_DATABASE_URL}"
max_connections = 10
connection_timeout_seconds = 30
statement_timeout_seconds = 60
# disable | prefer | require
ssl_mode = "prefer"

[storage]
base_url = "https://your-project.example.co"
service_key = "${RB_STORAGE_SERVICE_KEY}"
lead_bucket = "lead-documents"
user_bucket = "user-documents"
timeout_seconds = 60
# Cannot be disabled in production
tls_verify = true

[storage.retry]
# 1 disables retry
max_attempts = 3
initial_delay_ms = 500
max_delay_ms = 5000
backoff_multiplier = 2.0

[export]
# 1 downloads documents one at a time
download_concurrency = 1
include_checksums = true

[export.tables]
contact_requests = "contact_requests"
property_applications = "property_applications"
properties = "properties"
cities = "cities"
documents = "documents"
lead_documents = "lead_documents"
user_documents = "user_documents"

[logging]
local_enabled = false
local_path = "logs"
# daily | hourly | never
local_rotation = "daily"
"#
    .to_string()
}
