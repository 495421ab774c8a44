//! Export command implementation
//!
//! This module implements the `export` command, which runs one export
//! outside the HTTP service and writes the archive to a directory.

use super::build_coordinator;
use crate::config::load_config;
use crate::domain::{BackupError, ExportKind, ExportRequest};
use clap::Args;
use std::fs;
use std::path::PathBuf;
use tokio::sync::watch;

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Archive to produce (full or leads)
    #[arg(short, long, default_value = "full")]
    pub kind: ExportKind,

    /// Directory the archive is written to
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Cutoff date recorded in the manifest
    #[arg(long)]
    pub cutoff_date: Option<String>,
}

impl ExportArgs {
    /// Execute the export command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!(kind = %self.kind, "Starting export command");

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Configuration validation failed");
                eprintln!("Configuration error: {e}");
                return Ok(2);
            }
        };

        let (coordinator, _) = match build_coordinator(&config, shutdown_signal) {
            Ok(parts) => parts,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create export coordinator");
                eprintln!("Failed to initialize export: {e}");
                return Ok(4);
            }
        };

        println!("🚀 Starting {} export...", self.kind);
        println!();

        let request = ExportRequest {
            cutoff_date: self.cutoff_date.clone(),
        };

        let archive = match coordinator.run(self.kind, request).await {
            Ok(a) => a,
            Err(BackupError::Cancelled) => {
                println!("⚠️  Export interrupted. No archive was written.");
                return Ok(130);
            }
            Err(e) => {
                tracing::error!(error = %e, "Export failed");
                eprintln!("Export failed: {e}");
                return Ok(5);
            }
        };

        fs::create_dir_all(&self.output)?;
        let path = self.output.join(&archive.filename);
        fs::write(&path, &archive.bytes)?;

        let manifest = &archive.manifest;
        println!("📊 Export Summary:");
        println!("  Archive: {} ({} bytes)", path.display(), archive.len());
        for (table, count) in &manifest.record_counts {
            println!("  {table}: {count} rows");
        }
        println!("  Documents: {}", manifest.total_documents);
        println!("  Downloaded: {}", manifest.successful_downloads);
        println!("  Failed: {}", manifest.failed_downloads);
        println!("  Duration: {:.2}s", manifest.duration_ms as f64 / 1000.0);
        println!();

        if manifest.failed_downloads > 0 {
            println!("⚠️  Export completed with failed downloads:");
            for (i, doc) in manifest.failed_documents.iter().enumerate() {
                if i < 10 {
                    println!("    - {doc}");
                }
            }
            if manifest.failed_documents.len() > 10 {
                println!(
                    "    ... and {} more",
                    manifest.failed_documents.len() - 10
                );
            }
            return Ok(1);
        }

        println!("✅ Export completed successfully!");
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_export_missing_config_is_configuration_error() {
        let args = ExportArgs {
            kind: ExportKind::LeadsExport,
            output: PathBuf::from("."),
            cutoff_date: None,
        };
        let (_tx, rx) = watch::channel(false);
        let code = args.execute("/nonexistent/config.toml", rx).await.unwrap();
        assert_eq!(code, 2);
    }
}
