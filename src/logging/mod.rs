//! Logging and observability
//!
//! Structured `tracing` output to the console, plus optional JSON log files
//! with rotation.
//!
//! ```no_run
//! use rental_backup::logging::init_logging;
//! use rental_backup::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Server started");
//! ```

pub mod structured;

pub use structured::{init_logging, parse_log_level, LoggingGuard};

/// Log entry into an export stage
///
/// ```no_run
/// use rental_backup::log_stage;
/// use rental_backup::domain::{ExportKind, ExportStage};
///
/// log_stage!("6f1c", ExportKind::FullBackup, ExportStage::Downloading);
/// ```
#[macro_export]
macro_rules! log_stage {
    ($run_id:expr, $kind:expr, $stage:expr) => {
        tracing::info!(
            run_id = %$run_id,
            export_kind = %$kind,
            stage = %$stage,
            "Export stage"
        );
    };
}

/// Log a document that could not be downloaded
#[macro_export]
macro_rules! log_download_failure {
    ($run_id:expr, $path:expr, $error:expr) => {
        tracing::warn!(
            run_id = %$run_id,
            file_path = %$path,
            error = %$error,
            "Document download failed"
        );
    };
}

/// Log a retry of a transient download failure
///
/// ```no_run
/// use rental_backup::log_retry_attempt;
///
/// log_retry_attempt!("c1/passport.pdf", 1, 3, 500, "Request timed out");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($path:expr, $attempt:expr, $max_attempts:expr, $delay_ms:expr, $error:expr) => {
        tracing::warn!(
            file_path = %$path,
            attempt = $attempt,
            max_attempts = $max_attempts,
            delay_ms = $delay_ms,
            error = %$error,
            "Retrying download after error"
        );
    };
}
