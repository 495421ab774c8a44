// rental-backup - Lead document export and backup service
// Copyright (c) 2025 rental-backup Contributors
// Licensed under the MIT License

//! # rental-backup
//!
//! Export and backup service for a property-rental back office. Each run
//! reads the business tables, serializes them to CSV, downloads the stored
//! documents they reference, and bundles everything with a JSON manifest
//! into one ZIP archive.
//!
//! ## Archives
//!
//! - **Full backup** (`backup_YYYY-MM-DD.zip`): every business table plus
//!   every lead and user document, with `backup_info.json`.
//! - **Leads export** (`leads_export_YYYY-MM-DD.zip`): contact requests,
//!   property applications and the documents linked to them, with
//!   `export_info.json`.
//!
//! A document that cannot be downloaded does not abort the run; it is
//! listed in the manifest instead.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`http`] - HTTP endpoints returning archives
//! - [`core`] - Export orchestration, CSV serialization, ZIP assembly, checksums
//! - [`adapters`] - PostgreSQL record source, storage REST client, in-memory fakes
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! Backends are injected as capability traits; the in-memory ones make a run
//! easy to try out:
//!
//! ```rust
//! use rental_backup::adapters::memory::{InMemoryObjectStore, InMemoryRecordSource};
//! use rental_backup::config::TablesConfig;
//! use rental_backup::core::export::{BucketMap, ExportCoordinator, ExportSettings};
//! use rental_backup::domain::{BucketName, ExportKind, ExportRequest};
//! use std::sync::Arc;
//! use tokio::sync::watch;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = ExportSettings {
//!         tables: TablesConfig::default(),
//!         buckets: BucketMap {
//!             leads: BucketName::new("lead-documents")?,
//!             users: BucketName::new("user-documents")?,
//!         },
//!         download_concurrency: 1,
//!         include_checksums: true,
//!     };
//!     let (_cancel_tx, cancel_rx) = watch::channel(false);
//!     let coordinator = ExportCoordinator::new(
//!         Arc::new(InMemoryRecordSource::new()),
//!         Arc::new(InMemoryObjectStore::new()),
//!         settings,
//!         cancel_rx,
//!     );
//!
//!     let archive = coordinator
//!         .run(ExportKind::LeadsExport, ExportRequest::default())
//!         .await?;
//!     assert_eq!(archive.manifest.total_documents, 0);
//!     assert!(archive.filename.starts_with("leads_export_"));
//!     Ok(())
//! }
//! ```
//!
//! Production wiring (PostgreSQL records, storage REST client) is in
//! [`cli::commands`].

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod http;
pub mod logging;
