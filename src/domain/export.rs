//! Export kinds, request parameters and orchestrator stages

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which archive an export run produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportKind {
    /// Every business table and every stored document
    FullBackup,
    /// Contact requests, applications and the documents linked to them
    LeadsExport,
}

impl ExportKind {
    /// Prefix of the suggested download filename
    pub fn filename_prefix(&self) -> &'static str {
        match self {
            ExportKind::FullBackup => "backup",
            ExportKind::LeadsExport => "leads_export",
        }
    }

    /// Archive path of the manifest entry
    pub fn manifest_path(&self) -> &'static str {
        match self {
            ExportKind::FullBackup => "backup_info.json",
            ExportKind::LeadsExport => "export_info.json",
        }
    }

    /// Returns the kind as its snake_case name
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportKind::FullBackup => "full_backup",
            ExportKind::LeadsExport => "leads_export",
        }
    }
}

impl fmt::Display for ExportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "full" | "backup" | "full_backup" => Ok(Self::FullBackup),
            "leads" | "leads_export" => Ok(Self::LeadsExport),
            _ => Err(format!(
                "Invalid export kind: {s}. Expected 'full' or 'leads'"
            )),
        }
    }
}

/// Optional parameters posted with an export request
///
/// `cutoff_date` is recorded in the manifest but does not filter rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRequest {
    #[serde(default)]
    pub cutoff_date: Option<String>,
}

impl ExportRequest {
    /// Parse a request body; an empty or whitespace-only body is the default request
    pub fn from_body(body: &[u8]) -> Result<Self, serde_json::Error> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body)
    }
}

/// Orchestrator stage
///
/// Runs move strictly forward through
/// `FetchingRecords → Serializing → EnumeratingDocuments → Downloading →
/// Finalizing → Done`. `Failed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportStage {
    FetchingRecords,
    Serializing,
    EnumeratingDocuments,
    Downloading,
    Finalizing,
    Done,
    Failed,
}

impl ExportStage {
    /// Whether a structural failure in this stage aborts the run
    ///
    /// Download failures are recorded in the manifest instead.
    pub fn can_fail(&self) -> bool {
        matches!(
            self,
            ExportStage::FetchingRecords
                | ExportStage::Serializing
                | ExportStage::EnumeratingDocuments
        )
    }

    /// Stage that follows this one on success
    pub fn next(&self) -> Option<ExportStage> {
        match self {
            ExportStage::FetchingRecords => Some(ExportStage::Serializing),
            ExportStage::Serializing => Some(ExportStage::EnumeratingDocuments),
            ExportStage::EnumeratingDocuments => Some(ExportStage::Downloading),
            ExportStage::Downloading => Some(ExportStage::Finalizing),
            ExportStage::Finalizing => Some(ExportStage::Done),
            ExportStage::Done | ExportStage::Failed => None,
        }
    }
}

impl fmt::Display for ExportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExportStage::FetchingRecords => "fetching records",
            ExportStage::Serializing => "serializing",
            ExportStage::EnumeratingDocuments => "enumerating documents",
            ExportStage::Downloading => "downloading",
            ExportStage::Finalizing => "finalizing",
            ExportStage::Done => "done",
            ExportStage::Failed => "failed",
        };
        f.write_str(s)
    }
}
