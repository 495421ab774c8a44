//! Domain models and types for rental-backup.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Validated names** ([`TableName`], [`BucketName`])
//! - **Record sets** ([`RecordSet`], [`Row`]) as returned by the relational backend
//! - **Document references** ([`DocumentReference`], [`DocumentCategory`])
//! - **Export parameters** ([`ExportKind`], [`ExportRequest`], [`ExportStage`])
//! - **Error types** ([`BackupError`], [`StorageError`], [`ArchiveError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, BackupError>`]:
//!
//! ```rust
//! use rental_backup::domain::{BackupError, Result};
//!
//! fn example() -> Result<()> {
//!     Err(BackupError::Validation("missing id".to_string()))
//! }
//! ```

pub mod document;
pub mod errors;
pub mod export;
pub mod ids;
pub mod record;
pub mod result;

// Re-export commonly used types for convenience
pub use document::{DocumentCategory, DocumentReference};
pub use errors::{ArchiveError, BackupError, StorageError};
pub use export::{ExportKind, ExportRequest, ExportStage};
pub use ids::{BucketName, TableName};
pub use record::{RecordSet, Row};
pub use result::Result;
