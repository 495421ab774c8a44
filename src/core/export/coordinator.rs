//! Export coordinator - drives one export run through its stages
//!
//! `FetchingRecords → Serializing → EnumeratingDocuments → Downloading →
//! Finalizing → Done`. Structural failures abort the run tagged with the
//! active stage; document download failures only show up in the manifest.

use crate::adapters::database::RecordSource;
use crate::adapters::storage::ObjectStore;
use crate::config::{BackupConfig, TablesConfig};
use crate::core::archive::ArchiveBuilder;
use crate::core::export::download::{download_all, BucketMap, DownloadOutcome};
use crate::core::export::enumerate::{enumerate_documents, FetchedRecords, TableRole};
use crate::core::export::manifest::ExportManifest;
use crate::core::transform::to_csv;
use crate::core::verification::{calculate_checksum_bytes, ChecksumSet};
use crate::domain::{BackupError, ExportKind, ExportRequest, ExportStage, Result};
use crate::{log_download_failure, log_stage};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::watch;
use uuid::Uuid;

/// Settings an export run needs from configuration
#[derive(Debug, Clone)]
pub struct ExportSettings {
    pub tables: TablesConfig,
    pub buckets: BucketMap,
    pub download_concurrency: usize,
    pub include_checksums: bool,
}

impl ExportSettings {
    pub fn from_config(config: &BackupConfig) -> Self {
        Self {
            tables: config.export.tables.clone(),
            buckets: BucketMap {
                leads: config.storage.lead_bucket.clone(),
                users: config.storage.user_bucket.clone(),
            },
            download_concurrency: config.export.download_concurrency,
            include_checksums: config.export.include_checksums,
        }
    }
}

/// Finished archive ready for transmission
#[derive(Debug, Clone)]
pub struct ExportArchive {
    pub bytes: Vec<u8>,
    /// `<prefix>_<YYYY-MM-DD>.zip`
    pub filename: String,
    pub manifest: ExportManifest,
}

impl ExportArchive {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Suggested download name for an archive created at `created_at`
pub fn archive_filename(kind: ExportKind, created_at: DateTime<Utc>) -> String {
    format!("{}_{}.zip", kind.filename_prefix(), created_at.format("%Y-%m-%d"))
}

/// Export coordinator
///
/// Holds the shared capabilities; every call to [`run`](Self::run) is an
/// independent run with its own archive builder.
#[derive(Clone)]
pub struct ExportCoordinator {
    records: Arc<dyn RecordSource>,
    store: Arc<dyn ObjectStore>,
    settings: ExportSettings,
    cancel: watch::Receiver<bool>,
}

struct RunState {
    run_id: String,
    kind: ExportKind,
    stage: ExportStage,
}

impl RunState {
    fn enter(&mut self, stage: ExportStage) {
        self.stage = stage;
        log_stage!(self.run_id, self.kind, stage);
    }
}

impl ExportCoordinator {
    /// Create a coordinator
    ///
    /// `cancel` flipping to `true` stops a run at the next stage boundary or
    /// before the next document download.
    pub fn new(
        records: Arc<dyn RecordSource>,
        store: Arc<dyn ObjectStore>,
        settings: ExportSettings,
        cancel: watch::Receiver<bool>,
    ) -> Self {
        Self {
            records,
            store,
            settings,
            cancel,
        }
    }

    /// Same coordinator observing a different cancellation signal
    pub fn with_cancel(&self, cancel: watch::Receiver<bool>) -> Self {
        Self {
            cancel,
            ..self.clone()
        }
    }

    pub fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    /// Execute one export run
    ///
    /// # Errors
    ///
    /// Returns [`BackupError::Stage`] for structural failures and
    /// [`BackupError::Cancelled`] when cancellation was signalled.
    pub async fn run(&self, kind: ExportKind, request: ExportRequest) -> Result<ExportArchive> {
        let created_at = Utc::now();
        let mut state = RunState {
            run_id: Uuid::new_v4().to_string(),
            kind,
            stage: ExportStage::FetchingRecords,
        };

        tracing::info!(
            run_id = %state.run_id,
            export_kind = %kind,
            cutoff_date = ?request.cutoff_date,
            "Starting export"
        );

        match self.execute(&mut state, request, created_at).await {
            Ok(archive) => {
                state.enter(ExportStage::Done);
                tracing::info!(
                    run_id = %state.run_id,
                    filename = %archive.filename,
                    bytes = archive.len(),
                    total_documents = archive.manifest.total_documents,
                    successful_downloads = archive.manifest.successful_downloads,
                    failed_downloads = archive.manifest.failed_downloads,
                    duration_ms = archive.manifest.duration_ms,
                    "Export completed"
                );
                Ok(archive)
            }
            Err(e) => {
                let failed_at = state.stage;
                state.enter(ExportStage::Failed);
                tracing::error!(
                    run_id = %state.run_id,
                    stage = %failed_at,
                    error = %e,
                    "Export failed"
                );
                Err(e)
            }
        }
    }

    fn check_cancelled(&self) -> Result<()> {
        if *self.cancel.borrow() {
            return Err(BackupError::Cancelled);
        }
        Ok(())
    }

    async fn execute(
        &self,
        state: &mut RunState,
        request: ExportRequest,
        created_at: DateTime<Utc>,
    ) -> Result<ExportArchive> {
        let kind = state.kind;
        let mut manifest = ExportManifest::new(state.run_id.clone(), kind, created_at);
        manifest.cutoff_date = request.cutoff_date;

        // Fetching
        state.enter(ExportStage::FetchingRecords);
        self.check_cancelled()?;
        let records = self
            .fetch_records(kind)
            .await
            .map_err(|e| e.at_stage(ExportStage::FetchingRecords))?;

        for set in records.sets() {
            manifest.record_counts.insert(set.name().to_string(), set.len());
        }
        manifest.total_contact_requests = records.count(TableRole::ContactRequests);

        // Serializing
        state.enter(ExportStage::Serializing);
        self.check_cancelled()?;
        let mut builder = ArchiveBuilder::new();
        let mut checksums = ChecksumSet::new();
        self.serialize_records(&records, &mut builder, &mut checksums)
            .map_err(|e| e.at_stage(ExportStage::Serializing))?;

        // Enumerating
        state.enter(ExportStage::EnumeratingDocuments);
        self.check_cancelled()?;
        let enumeration = enumerate_documents(kind, &records);
        for label in enumeration.unresolved {
            manifest.record_failure(label);
        }
        let references = enumeration.references;
        for doc in &references {
            *manifest
                .document_counts
                .entry(doc.category.to_string())
                .or_insert(0) += 1;
        }

        // Downloading
        state.enter(ExportStage::Downloading);
        self.check_cancelled()?;
        let outcomes = download_all(
            self.store.as_ref(),
            &self.settings.buckets,
            references,
            self.settings.download_concurrency,
            &self.cancel,
        )
        .await;

        for outcome in outcomes {
            match outcome {
                DownloadOutcome::Downloaded(doc, bytes) => {
                    let mut path = doc.archive_path();
                    if builder.contains(&path) {
                        path = doc.disambiguated_archive_path();
                    }
                    let checksum = calculate_checksum_bytes(&bytes);
                    match builder.add_binary(path.clone(), bytes) {
                        Ok(()) => {
                            checksums.insert(path, checksum);
                            manifest.record_success();
                        }
                        Err(e) => {
                            log_download_failure!(state.run_id, doc.file_path, e);
                            manifest.record_failure(doc.file_path);
                        }
                    }
                }
                DownloadOutcome::Failed(doc, e) => {
                    log_download_failure!(state.run_id, doc.file_path, e);
                    manifest.record_failure(doc.file_path);
                }
                DownloadOutcome::Skipped(_) => return Err(BackupError::Cancelled),
            }
        }
        self.check_cancelled()?;

        // Finalizing
        state.enter(ExportStage::Finalizing);
        if self.settings.include_checksums {
            manifest.checksums = checksums.into_map();
        }
        manifest.complete(Utc::now());
        debug_assert!(manifest.is_consistent());

        let bytes = manifest
            .to_json_pretty()
            .and_then(|json| builder.add_text(kind.manifest_path(), json))
            .and_then(|()| builder.finalize())
            .map_err(|e| e.at_stage(ExportStage::Finalizing))?;

        Ok(ExportArchive {
            bytes,
            filename: archive_filename(kind, created_at),
            manifest,
        })
    }

    async fn fetch_records(&self, kind: ExportKind) -> Result<FetchedRecords> {
        let roles = TableRole::for_kind(kind);
        let fetches = roles.iter().map(|role| async move {
            let table = role.table(&self.settings.tables);
            self.records.fetch_table(table).await.map(|set| (*role, set))
        });

        let mut records = FetchedRecords::new(futures::future::try_join_all(fetches).await?);

        if kind == ExportKind::LeadsExport {
            let removed = records.retain_applicant_user_documents();
            tracing::debug!(removed, "Filtered user documents to applicants");
        }

        Ok(records)
    }

    fn serialize_records(
        &self,
        records: &FetchedRecords,
        builder: &mut ArchiveBuilder,
        checksums: &mut ChecksumSet,
    ) -> Result<()> {
        for set in records.sets() {
            if set.is_empty() {
                continue;
            }
            let csv = to_csv(set)?;
            let path = format!("data/{}.csv", set.name());
            checksums.record(path.as_str(), csv.as_bytes());
            builder.add_text(path, csv)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryObjectStore, InMemoryRecordSource};
    use crate::domain::{BucketName, Row, StorageError};
    use serde_json::{json, Value};
    use std::io::{Cursor, Read};

    fn rows(values: Vec<Value>) -> Vec<Row> {
        values
            .into_iter()
            .map(|v| match v {
                Value::Object(map) => map,
                _ => panic!("expected object"),
            })
            .collect()
    }

    fn settings() -> ExportSettings {
        ExportSettings {
            tables: TablesConfig::default(),
            buckets: BucketMap {
                leads: BucketName::new("lead-documents").unwrap(),
                users: BucketName::new("user-documents").unwrap(),
            },
            download_concurrency: 1,
            include_checksums: true,
        }
    }

    fn coordinator(
        records: InMemoryRecordSource,
        store: InMemoryObjectStore,
    ) -> (ExportCoordinator, watch::Sender<bool>) {
        let (tx, rx) = watch::channel(false);
        (
            ExportCoordinator::new(Arc::new(records), Arc::new(store), settings(), rx),
            tx,
        )
    }

    fn entry_names(bytes: &[u8]) -> Vec<String> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
        (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect()
    }

    fn read_entry(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
        let mut file = archive.by_name(name).unwrap();
        let mut text = String::new();
        file.read_to_string(&mut text).unwrap();
        text
    }

    #[test]
    fn test_archive_filename() {
        let at = DateTime::parse_from_rfc3339("2024-06-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(archive_filename(ExportKind::FullBackup, at), "backup_2024-06-01.zip");
        assert_eq!(
            archive_filename(ExportKind::LeadsExport, at),
            "leads_export_2024-06-01.zip"
        );
    }

    #[tokio::test]
    async fn test_full_backup_layout() {
        let records = InMemoryRecordSource::new()
            .with_table("cities", rows(vec![json!({"id": 1, "name": "Lisbon"})]))
            .with_table(
                "documents",
                rows(vec![json!({
                    "id": "d1",
                    "contact_request_id": "c1",
                    "document_type": "id_card",
                    "file_name": "a.pdf",
                    "file_path": "c1/a.pdf"
                })]),
            );
        let store = InMemoryObjectStore::new().with_object("lead-documents", "c1/a.pdf", b"PDF".to_vec());
        let (coordinator, _tx) = coordinator(records, store);

        let archive = coordinator
            .run(ExportKind::FullBackup, ExportRequest::default())
            .await
            .unwrap();

        assert_eq!(
            entry_names(&archive.bytes),
            vec![
                "data/cities.csv",
                "data/documents.csv",
                "documents/leads/c1/id_card/a.pdf",
                "backup_info.json"
            ]
        );
        assert_eq!(archive.manifest.successful_downloads, 1);
        assert_eq!(archive.manifest.record_counts["contact_requests"], 0);
        assert!(archive.manifest.checksums.contains_key("documents/leads/c1/id_card/a.pdf"));
        assert!(archive.filename.starts_with("backup_"));

        let manifest: Value = serde_json::from_str(&read_entry(&archive.bytes, "backup_info.json")).unwrap();
        assert_eq!(manifest["export_kind"], "full_backup");
    }

    #[tokio::test]
    async fn test_colliding_paths_are_disambiguated() {
        let records = InMemoryRecordSource::new().with_table(
            "documents",
            rows(vec![
                json!({"id": "d1", "contact_request_id": "c1", "file_name": "scan.pdf", "file_path": "c1/1_scan.pdf"}),
                json!({"id": "d2", "contact_request_id": "c1", "file_name": "scan.pdf", "file_path": "c1/2_scan.pdf"}),
            ]),
        );
        let store = InMemoryObjectStore::new()
            .with_object("lead-documents", "c1/1_scan.pdf", b"1".to_vec())
            .with_object("lead-documents", "c1/2_scan.pdf", b"2".to_vec());
        let (coordinator, _tx) = coordinator(records, store);

        let archive = coordinator
            .run(ExportKind::FullBackup, ExportRequest::default())
            .await
            .unwrap();
        let names = entry_names(&archive.bytes);
        assert!(names.contains(&"documents/leads/c1/other/scan.pdf".to_string()));
        assert!(names.contains(&"documents/leads/c1/other/d2_scan.pdf".to_string()));
        assert_eq!(archive.manifest.successful_downloads, 2);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_tagged_with_stage() {
        let records = InMemoryRecordSource::new().fail_table("properties", "permission denied");
        let (coordinator, _tx) = coordinator(records, InMemoryObjectStore::new());

        let err = coordinator
            .run(ExportKind::FullBackup, ExportRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.stage(), Some(ExportStage::FetchingRecords));
    }

    #[tokio::test]
    async fn test_unusable_document_row_counts_as_failure() {
        let records = InMemoryRecordSource::new()
            .with_table("cities", rows(vec![json!({"id": 1, "name": "Lisbon"})]))
            .with_table(
                "documents",
                rows(vec![
                    json!({"id": "d1", "contact_request_id": "c1"}),
                    json!({"id": "d2", "contact_request_id": "c1", "file_path": "c1/b.pdf"}),
                ]),
            );
        let store = InMemoryObjectStore::new().with_object("lead-documents", "c1/b.pdf", b"b".to_vec());
        let (coordinator, _tx) = coordinator(records, store);

        let archive = coordinator
            .run(ExportKind::FullBackup, ExportRequest::default())
            .await
            .unwrap();
        let manifest = &archive.manifest;
        assert_eq!(manifest.total_documents, 2);
        assert_eq!(manifest.successful_downloads, 1);
        assert_eq!(manifest.failed_downloads, 1);
        assert_eq!(manifest.failed_documents, vec!["documents/d1"]);
        assert!(manifest.is_consistent());

        let names = entry_names(&archive.bytes);
        assert!(names.contains(&"data/cities.csv".to_string()));
        assert!(names.contains(&"documents/leads/c1/other/b.pdf".to_string()));
    }

    #[tokio::test]
    async fn test_double_collision_keeps_checksum_of_stored_entry() {
        let records = InMemoryRecordSource::new().with_table(
            "documents",
            rows(vec![
                json!({"id": "d1", "contact_request_id": "c1", "file_name": "d2_scan.pdf", "file_path": "c1/p1"}),
                json!({"id": "dx", "contact_request_id": "c1", "file_name": "scan.pdf", "file_path": "c1/p2"}),
                json!({"id": "d2", "contact_request_id": "c1", "file_name": "scan.pdf", "file_path": "c1/p3"}),
            ]),
        );
        let store = InMemoryObjectStore::new()
            .with_object("lead-documents", "c1/p1", b"ONE".to_vec())
            .with_object("lead-documents", "c1/p2", b"TWO".to_vec())
            .with_object("lead-documents", "c1/p3", b"THREE".to_vec());
        let (coordinator, _tx) = coordinator(records, store);

        let archive = coordinator
            .run(ExportKind::FullBackup, ExportRequest::default())
            .await
            .unwrap();
        let manifest = &archive.manifest;
        assert_eq!(manifest.successful_downloads, 2);
        assert_eq!(manifest.failed_documents, vec!["c1/p3"]);

        let path = "documents/leads/c1/other/d2_scan.pdf";
        assert_eq!(read_entry(&archive.bytes, path), "ONE");
        assert_eq!(manifest.checksums[path], calculate_checksum_bytes(b"ONE"));
        assert_eq!(
            manifest.checksums["documents/leads/c1/other/scan.pdf"],
            calculate_checksum_bytes(b"TWO")
        );
    }

    #[tokio::test]
    async fn test_download_failures_do_not_abort() {
        let records = InMemoryRecordSource::new().with_table(
            "lead_documents",
            rows(vec![json!({"id": "l1", "contact_request_id": "c1", "file_path": "c1/a.pdf"})]),
        );
        let store = InMemoryObjectStore::new().with_failure(
            "lead-documents",
            "c1/a.pdf",
            StorageError::PermissionDenied {
                path: "c1/a.pdf".to_string(),
                message: "denied".to_string(),
            },
        );
        let (coordinator, _tx) = coordinator(records, store);

        let archive = coordinator
            .run(ExportKind::LeadsExport, ExportRequest::default())
            .await
            .unwrap();
        assert_eq!(archive.manifest.failed_downloads, 1);
        assert_eq!(archive.manifest.failed_documents, vec!["c1/a.pdf"]);
        assert!(entry_names(&archive.bytes).contains(&"export_info.json".to_string()));
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let (coordinator, tx) = coordinator(InMemoryRecordSource::new(), InMemoryObjectStore::new());
        tx.send(true).unwrap();

        let err = coordinator
            .run(ExportKind::FullBackup, ExportRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, BackupError::Cancelled));
    }

    #[tokio::test]
    async fn test_cutoff_date_recorded_without_filtering() {
        let records = InMemoryRecordSource::new().with_table(
            "contact_requests",
            rows(vec![
                json!({"id": 1, "created_at": "2024-07-01"}),
                json!({"id": 2, "created_at": "2023-01-01"}),
            ]),
        );
        let (coordinator, _tx) = coordinator(records, InMemoryObjectStore::new());
        let request = ExportRequest {
            cutoff_date: Some("2024-01-01".to_string()),
        };

        let archive = coordinator.run(ExportKind::LeadsExport, request).await.unwrap();
        assert_eq!(archive.manifest.cutoff_date.as_deref(), Some("2024-01-01"));
        assert_eq!(archive.manifest.total_contact_requests, 2);
    }
}
