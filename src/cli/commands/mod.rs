//! CLI command implementations
//!
//! Commands return a process exit code: `0` success, `2` configuration
//! error, `4` connection error, `5` fatal error.

pub mod export;
pub mod init;
pub mod serve;
pub mod validate;

use crate::adapters::database::{create_backends, Backends};
use crate::adapters::storage::StorageClient;
use crate::config::BackupConfig;
use crate::core::export::{ExportCoordinator, ExportSettings};
use crate::domain::Result;
use std::sync::Arc;
use tokio::sync::watch;

/// Build a coordinator wired to the configured backends
///
/// Also returns the backends so callers can use the session verifier.
pub(crate) fn build_coordinator(
    config: &BackupConfig,
    shutdown: watch::Receiver<bool>,
) -> Result<(ExportCoordinator, Backends)> {
    let backends = create_backends(config)?;
    let store = Arc::new(StorageClient::new(&config.storage)?);
    let coordinator = ExportCoordinator::new(
        backends.records.clone(),
        store,
        ExportSettings::from_config(config),
        shutdown,
    );
    Ok((coordinator, backends))
}
