//! Configuration management
//!
//! rental-backup reads a TOML file with `${VAR_NAME}` substitution and
//! `RB_<SECTION>_<KEY>` environment overrides, then validates it.
//!
//! ```toml
//! [server]
//! port = 8080
//!
//! [database]
//! connection_string = "${RB_DATABASE_URL}"
//!
//! [storage]
//! base_url = "https://project.supabase.co"
//! service_key = "${RB_SERVICE_KEY}"
//!
//! [export]
//! download_concurrency = 1
//! ```
//!
//! Sections:
//!
//! - [`ApplicationConfig`] - log level
//! - [`ServerConfig`] - bind address, CORS origins, admin session guard
//! - [`DatabaseConfig`] - PostgreSQL connection
//! - [`StorageConfig`] - object storage endpoint, buckets and [`RetryConfig`]
//! - [`ExportConfig`] - download concurrency and [`TablesConfig`]
//! - [`LoggingConfig`] - local JSON file logging

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::{load_config, parse_config};
pub use schema::{
    ApplicationConfig, BackupConfig, DatabaseConfig, Environment, ExportConfig, LoggingConfig,
    RetryConfig, ServerConfig, StorageConfig, TablesConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
