//! Core export pipeline
//!
//! - [`export`] - orchestration of one export run
//! - [`transform`] - record set → CSV
//! - [`archive`] - in-memory ZIP assembly
//! - [`verification`] - entry checksums for the manifest
//!
//! ```rust,no_run
//! use rental_backup::adapters::database::create_backends;
//! use rental_backup::adapters::storage::StorageClient;
//! use rental_backup::config::load_config;
//! use rental_backup::core::export::{ExportCoordinator, ExportSettings};
//! use rental_backup::domain::{ExportKind, ExportRequest};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("rental-backup.toml")?;
//! let backends = create_backends(&config)?;
//! let store = Arc::new(StorageClient::new(&config.storage)?);
//! let (_cancel_tx, cancel_rx) = tokio::sync::watch::channel(false);
//!
//! let coordinator = ExportCoordinator::new(
//!     backends.records,
//!     store,
//!     ExportSettings::from_config(&config),
//!     cancel_rx,
//! );
//! let archive = coordinator.run(ExportKind::FullBackup, ExportRequest::default()).await?;
//! println!("{} ({} bytes)", archive.filename, archive.len());
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod export;
pub mod transform;
pub mod verification;
