//! Relational backend capabilities
//!
//! The export pipeline only ever reads whole tables, and the HTTP guard only
//! ever resolves a session token. Both are expressed as traits so that tests
//! and alternative backends can be injected.

use crate::domain::ids::TableName;
use crate::domain::{RecordSet, Result};
use async_trait::async_trait;

/// Reads record sets from the relational backend
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Check that the backend is reachable
    ///
    /// # Errors
    ///
    /// Returns an error if the connection test fails.
    async fn test_connection(&self) -> Result<()>;

    /// Fetch every row of `table`, newest first by `created_at`
    ///
    /// The returned set is named after the table's base name.
    ///
    /// # Errors
    ///
    /// Returns [`BackupError::Database`](crate::domain::BackupError::Database)
    /// when the query fails.
    async fn fetch_table(&self, table: &TableName) -> Result<RecordSet>;
}

/// Session resolved from a bearer token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSession {
    pub role: String,
    pub user_id: Option<String>,
}

/// Resolves bearer tokens into sessions
#[async_trait]
pub trait SessionVerifier: Send + Sync {
    /// Look up a live session for `token`
    ///
    /// Returns `Ok(None)` for unknown or expired tokens.
    ///
    /// # Errors
    ///
    /// Returns an error only if the lookup itself fails.
    async fn verify(&self, token: &str) -> Result<Option<AdminSession>>;
}
