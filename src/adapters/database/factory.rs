//! Backend client factory
//!
//! Builds the relational capabilities from configuration. The record source
//! and the session verifier share one connection pool.

use crate::adapters::database::traits::{RecordSource, SessionVerifier};
use crate::adapters::postgresql::{PostgreSQLAdapter, PostgreSQLClient};
use crate::config::schema::BackupConfig;
use crate::domain::Result;
use std::sync::Arc;

/// Relational capabilities built from configuration
#[derive(Clone)]
pub struct Backends {
    pub records: Arc<dyn RecordSource>,
    /// Present only when `server.require_admin_session` is enabled
    pub sessions: Option<Arc<dyn SessionVerifier>>,
}

/// Create the PostgreSQL-backed capabilities
///
/// # Errors
///
/// Returns an error if the connection string is invalid or the pool cannot be built.
pub fn create_backends(config: &BackupConfig) -> Result<Backends> {
    tracing::info!("Creating PostgreSQL client");
    let client = Arc::new(PostgreSQLClient::new(config.database.clone())?);

    let records: Arc<dyn RecordSource> = Arc::new(PostgreSQLAdapter::new_with_arc(client.clone()));

    let sessions = if config.server.require_admin_session {
        tracing::info!(table = %config.server.session_table, "Admin session guard enabled");
        let adapter = PostgreSQLAdapter::new_with_arc(client)
            .with_session_table(config.server.session_table.clone());
        Some(Arc::new(adapter) as Arc<dyn SessionVerifier>)
    } else {
        None
    };

    Ok(Backends { records, sessions })
}
