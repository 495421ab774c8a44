//! Domain error types
//!
//! This module defines the error hierarchy for rental-backup.
//! All errors are domain-specific and don't expose third-party types.

use super::export::ExportStage;
use thiserror::Error;

/// Main rental-backup error type
///
/// This is the primary error type used throughout the library.
/// Structural failures abort an export run; per-object failures are
/// represented by [`StorageError`] values that the orchestrator records
/// instead of propagating.
#[derive(Debug, Error)]
pub enum BackupError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Relational query errors
    #[error("Database error: {0}")]
    Database(String),

    /// Object store errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Archive assembly errors
    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),

    /// CSV rendering errors
    #[error("CSV error: {0}")]
    Csv(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Malformed request body or parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Authentication errors
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// The run was cancelled before completion
    #[error("Export cancelled")]
    Cancelled,

    /// A structural failure raised while the orchestrator was in `stage`
    #[error("Export failed while {stage}: {source}")]
    Stage {
        /// Stage that was active when the failure happened
        stage: ExportStage,
        /// Underlying error
        #[source]
        source: Box<BackupError>,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl BackupError {
    /// Attach the active export stage to this error
    ///
    /// Errors that already carry a stage, and cancellations, are returned unchanged.
    pub fn at_stage(self, stage: ExportStage) -> Self {
        match self {
            BackupError::Stage { .. } | BackupError::Cancelled => self,
            other => BackupError::Stage {
                stage,
                source: Box::new(other),
            },
        }
    }

    /// Stage at which a structural failure occurred, if known
    pub fn stage(&self) -> Option<ExportStage> {
        match self {
            BackupError::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

/// Object store errors
///
/// Every variant carries the object path so a failed download can be
/// reported in the export manifest.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    /// Object does not exist
    #[error("Object not found: {path}")]
    NotFound { path: String },

    /// Credentials rejected or access denied
    #[error("Permission denied for {path}: {message}")]
    PermissionDenied { path: String, message: String },

    /// Failed to reach the object store
    #[error("Connection failed for {path}: {message}")]
    Connection { path: String, message: String },

    /// Request timed out
    #[error("Request timeout for {path}")]
    Timeout { path: String },

    /// Server error (5xx)
    #[error("Server error for {path}: {status} - {message}")]
    ServerError {
        path: String,
        status: u16,
        message: String,
    },

    /// Client error (4xx other than 401/403/404)
    #[error("Client error for {path}: {status} - {message}")]
    ClientError {
        path: String,
        status: u16,
        message: String,
    },
}

impl StorageError {
    /// Path of the object the failure refers to
    pub fn path(&self) -> &str {
        match self {
            StorageError::NotFound { path }
            | StorageError::PermissionDenied { path, .. }
            | StorageError::Connection { path, .. }
            | StorageError::Timeout { path }
            | StorageError::ServerError { path, .. }
            | StorageError::ClientError { path, .. } => path,
        }
    }

    /// Whether retrying the same request may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            StorageError::Connection { .. }
            | StorageError::Timeout { .. }
            | StorageError::ServerError { .. } => true,
            StorageError::ClientError { status, .. } => *status == 429,
            StorageError::NotFound { .. } | StorageError::PermissionDenied { .. } => false,
        }
    }
}

/// Archive builder errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArchiveError {
    /// An entry with this path was already added
    #[error("Duplicate archive path: {0}")]
    DuplicatePath(String),

    /// Entry path is empty, absolute, or escapes the archive root
    #[error("Invalid archive path: {0}")]
    InvalidPath(String),

    /// Writing the compressed archive failed
    #[error("Failed to write archive: {0}")]
    WriteFailed(String),
}

// Conversion from std::io::Error
impl From<std::io::Error> for BackupError {
    fn from(err: std::io::Error) -> Self {
        BackupError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for BackupError {
    fn from(err: serde_json::Error) -> Self {
        BackupError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for BackupError {
    fn from(err: toml::de::Error) -> Self {
        BackupError::Configuration(format!("TOML parse error: {err}"))
    }
}

impl From<csv::Error> for BackupError {
    fn from(err: csv::Error) -> Self {
        BackupError::Csv(err.to_string())
    }
}

impl From<zip::result::ZipError> for ArchiveError {
    fn from(err: zip::result::ZipError) -> Self {
        ArchiveError::WriteFailed(err.to_string())
    }
}

impl From<tokio_postgres::Error> for BackupError {
    fn from(err: tokio_postgres::Error) -> Self {
        BackupError::Database(err.to_string())
    }
}
