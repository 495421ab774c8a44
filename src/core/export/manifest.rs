//! Export manifest
//!
//! Summary of one run, written as the last archive entry.

use crate::domain::{BackupError, ExportKind, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Outcome of one export run
///
/// `successful_downloads + failed_downloads == total_documents` always holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportManifest {
    pub run_id: String,
    pub export_kind: ExportKind,
    pub created_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_ms: u64,

    /// Rows per record set, including empty sets
    pub record_counts: BTreeMap<String, usize>,

    /// Document references per category
    pub document_counts: BTreeMap<String, usize>,

    pub total_contact_requests: usize,

    /// Document references attempted
    pub total_documents: usize,
    pub successful_downloads: usize,
    pub failed_downloads: usize,

    /// Storage paths of the documents that could not be downloaded
    pub failed_documents: Vec<String>,

    /// sha256 per archive entry path, excluding the manifest itself
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub checksums: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cutoff_date: Option<String>,
}

impl ExportManifest {
    /// Empty manifest for a run starting at `created_at`
    pub fn new(run_id: impl Into<String>, export_kind: ExportKind, created_at: DateTime<Utc>) -> Self {
        Self {
            run_id: run_id.into(),
            export_kind,
            created_at,
            completed_at: created_at,
            duration_ms: 0,
            record_counts: BTreeMap::new(),
            document_counts: BTreeMap::new(),
            total_contact_requests: 0,
            total_documents: 0,
            successful_downloads: 0,
            failed_downloads: 0,
            failed_documents: Vec::new(),
            checksums: BTreeMap::new(),
            cutoff_date: None,
        }
    }

    pub fn record_success(&mut self) {
        self.total_documents += 1;
        self.successful_downloads += 1;
    }

    pub fn record_failure(&mut self, file_path: impl Into<String>) {
        self.total_documents += 1;
        self.failed_downloads += 1;
        self.failed_documents.push(file_path.into());
    }

    /// Whether the download tally matches the number of attempts
    pub fn is_consistent(&self) -> bool {
        self.successful_downloads + self.failed_downloads == self.total_documents
            && self.failed_documents.len() == self.failed_downloads
    }

    /// Stamp completion time and duration
    pub fn complete(&mut self, completed_at: DateTime<Utc>) {
        self.completed_at = completed_at;
        self.duration_ms = (completed_at - self.created_at)
            .num_milliseconds()
            .max(0) as u64;
    }

    /// Pretty-printed JSON
    ///
    /// # Errors
    ///
    /// Returns [`BackupError::Serialization`] if encoding fails.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| BackupError::Serialization(format!("Failed to encode manifest: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_empty_manifest_is_consistent() {
        let manifest = ExportManifest::new("run", ExportKind::FullBackup, Utc::now());
        assert!(manifest.is_consistent());
        assert_eq!(manifest.total_documents, 0);
    }

    #[test]
    fn test_tally() {
        let mut manifest = ExportManifest::new("run", ExportKind::LeadsExport, Utc::now());
        manifest.record_success();
        manifest.record_failure("c1/a.pdf");
        manifest.record_success();
        assert_eq!(manifest.total_documents, 3);
        assert_eq!(manifest.successful_downloads, 2);
        assert_eq!(manifest.failed_documents, vec!["c1/a.pdf"]);
        assert!(manifest.is_consistent());
    }

    #[test]
    fn test_complete_sets_duration() {
        let start = Utc::now();
        let mut manifest = ExportManifest::new("run", ExportKind::FullBackup, start);
        manifest.complete(start + Duration::milliseconds(1500));
        assert_eq!(manifest.duration_ms, 1500);
    }

    #[test]
    fn test_json_shape() {
        let mut manifest = ExportManifest::new("run-1", ExportKind::FullBackup, Utc::now());
        manifest.record_counts.insert("cities".to_string(), 0);
        let json: serde_json::Value =
            serde_json::from_str(&manifest.to_json_pretty().unwrap()).unwrap();

        assert_eq!(json["export_kind"], "full_backup");
        assert_eq!(json["successful_downloads"], 0);
        assert_eq!(json["record_counts"]["cities"], 0);
        assert!(json.get("checksums").is_none());
        assert!(json.get("cutoff_date").is_none());
    }
}
