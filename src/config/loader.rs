//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::BackupConfig;
use super::secret::secret_string;
use crate::domain::errors::BackupError;
use crate::domain::ids::{BucketName, TableName};
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (`${VAR}` syntax)
/// 3. Parses the TOML into [`BackupConfig`]
/// 4. Applies environment variable overrides (`RB_*` prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`BackupError::Configuration`] if the file is missing or unreadable,
/// a referenced variable is unset, parsing fails, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use rental_backup::config::load_config;
///
/// let config = load_config("rental-backup.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<BackupConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(BackupError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        BackupError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&contents)
}

/// Parses configuration text, applying substitution, overrides and validation
///
/// # Errors
///
/// Same conditions as [`load_config`] apart from file access.
pub fn parse_config(contents: &str) -> Result<BackupConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: BackupConfig = toml::from_str(&contents)
        .map_err(|e| BackupError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        BackupError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("placeholder pattern is valid")
    })
}

/// Substitutes `${VAR_NAME}` placeholders
///
/// Comment lines are copied untouched.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = placeholder_pattern();
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let processed = re.replace_all(line, |caps: &regex::Captures<'_>| {
            let var_name = &caps[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                    String::new()
                }
            }
        });
        result.push_str(&processed);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(BackupError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match env(name) {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| {
            BackupError::Configuration(format!("Invalid value for {name}: '{raw}'"))
        }),
    }
}

fn table_env(name: &str) -> Result<Option<TableName>> {
    env(name)
        .map(|raw| {
            TableName::new(raw)
                .map_err(|e| BackupError::Configuration(format!("Invalid value for {name}: {e}")))
        })
        .transpose()
}

fn bucket_env(name: &str) -> Result<Option<BucketName>> {
    env(name)
        .map(|raw| {
            BucketName::new(raw)
                .map_err(|e| BackupError::Configuration(format!("Invalid value for {name}: {e}")))
        })
        .transpose()
}

/// Applies environment variable overrides using the `RB_*` prefix
///
/// Variables follow the pattern `RB_<SECTION>_<KEY>`, for example
/// `RB_SERVER_PORT` or `RB_STORAGE_SERVICE_KEY`.
fn apply_env_overrides(config: &mut BackupConfig) -> Result<()> {
    // Application
    if let Some(val) = env("RB_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Server
    if let Some(val) = env("RB_SERVER_HOST") {
        config.server.host = val;
    }
    if let Some(port) = parse_env("RB_SERVER_PORT")? {
        config.server.port = port;
    }
    if let Some(workers) = parse_env("RB_SERVER_WORKERS")? {
        config.server.workers = Some(workers);
    }
    if let Some(val) = env("RB_SERVER_ALLOWED_ORIGINS") {
        config.server.allowed_origins = split_list(&val);
    }
    if let Some(flag) = parse_env("RB_SERVER_REQUIRE_ADMIN_SESSION")? {
        config.server.require_admin_session = flag;
    }

    // Database
    if let Some(val) = env("RB_DATABASE_CONNECTION_STRING") {
        config.database.connection_string = secret_string(val);
    }
    if let Some(max) = parse_env("RB_DATABASE_MAX_CONNECTIONS")? {
        config.database.max_connections = max;
    }
    if let Some(val) = env("RB_DATABASE_SSL_MODE") {
        config.database.ssl_mode = val;
    }

    // Storage
    if let Some(val) = env("RB_STORAGE_BASE_URL") {
        config.storage.base_url = val;
    }
    if let Some(val) = env("RB_STORAGE_SERVICE_KEY") {
        config.storage.service_key = secret_string(val);
    }
    if let Some(bucket) = bucket_env("RB_STORAGE_LEAD_BUCKET")? {
        config.storage.lead_bucket = bucket;
    }
    if let Some(bucket) = bucket_env("RB_STORAGE_USER_BUCKET")? {
        config.storage.user_bucket = bucket;
    }
    if let Some(timeout) = parse_env("RB_STORAGE_TIMEOUT_SECONDS")? {
        config.storage.timeout_seconds = timeout;
    }
    if let Some(flag) = parse_env("RB_STORAGE_TLS_VERIFY")? {
        config.storage.tls_verify = flag;
    }
    if let Some(attempts) = parse_env("RB_STORAGE_RETRY_MAX_ATTEMPTS")? {
        config.storage.retry.max_attempts = attempts;
    }

    // Export
    if let Some(concurrency) = parse_env("RB_EXPORT_DOWNLOAD_CONCURRENCY")? {
        config.export.download_concurrency = concurrency;
    }
    if let Some(table) = table_env("RB_EXPORT_TABLES_CONTACT_REQUESTS")? {
        config.export.tables.contact_requests = table;
    }
    if let Some(table) = table_env("RB_EXPORT_TABLES_PROPERTY_APPLICATIONS")? {
        config.export.tables.property_applications = table;
    }
    if let Some(table) = table_env("RB_EXPORT_TABLES_DOCUMENTS")? {
        config.export.tables.documents = table;
    }

    // Logging
    if let Some(flag) = parse_env("RB_LOGGING_LOCAL_ENABLED")? {
        config.logging.local_enabled = flag;
    }
    if let Some(val) = env("RB_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
