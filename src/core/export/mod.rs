//! Export orchestration
//!
//! - [`coordinator`] - stage machine driving one run
//! - [`enumerate`] - table selection and document enumeration per export kind
//! - [`download`] - per-document downloads with isolated failures
//! - [`manifest`] - run summary written into the archive

pub mod coordinator;
pub mod download;
pub mod enumerate;
pub mod manifest;

pub use coordinator::{archive_filename, ExportArchive, ExportCoordinator, ExportSettings};
pub use download::{BucketMap, DownloadOutcome};
pub use enumerate::{DocumentEnumeration, FetchedRecords, TableRole};
pub use manifest::ExportManifest;
