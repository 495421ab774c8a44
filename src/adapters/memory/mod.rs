//! In-memory backends
//!
//! Deterministic implementations of the capability traits for tests.
//! Failures can be injected per table and per object.

use crate::adapters::database::traits::{AdminSession, RecordSource, SessionVerifier};
use crate::adapters::storage::traits::ObjectStore;
use crate::domain::ids::TableName;
use crate::domain::{BackupError, BucketName, RecordSet, Result, Row, StorageError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::watch;

/// Tables held in memory
///
/// Unknown tables read as empty sets. Rows are returned in insertion order.
#[derive(Debug, Default)]
pub struct InMemoryRecordSource {
    tables: HashMap<String, Vec<Row>>,
    failing: HashMap<String, String>,
}

impl InMemoryRecordSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the rows of `table`
    pub fn with_table(mut self, table: &str, rows: Vec<Row>) -> Self {
        self.tables.insert(table.to_string(), rows);
        self
    }

    /// Make every read of `table` fail with `message`
    pub fn fail_table(mut self, table: &str, message: &str) -> Self {
        self.failing.insert(table.to_string(), message.to_string());
        self
    }
}

#[async_trait]
impl RecordSource for InMemoryRecordSource {
    async fn test_connection(&self) -> Result<()> {
        Ok(())
    }

    async fn fetch_table(&self, table: &TableName) -> Result<RecordSet> {
        if let Some(message) = self.failing.get(table.as_str()) {
            return Err(BackupError::Database(format!(
                "Failed to read {table}: {message}"
            )));
        }
        let rows = self.tables.get(table.as_str()).cloned().unwrap_or_default();
        Ok(RecordSet::new(table.base_name(), rows))
    }
}

/// Objects held in memory, keyed by bucket and path
#[derive(Debug, Default)]
pub struct InMemoryObjectStore {
    objects: HashMap<(String, String), Vec<u8>>,
    failures: HashMap<(String, String), StorageError>,
    requests: Mutex<Vec<String>>,
    cancel_after: Option<(usize, watch::Sender<bool>)>,
    completed: AtomicUsize,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `bytes` at `bucket/path`
    pub fn with_object(mut self, bucket: &str, path: &str, bytes: impl Into<Vec<u8>>) -> Self {
        self.objects
            .insert((bucket.to_string(), path.to_string()), bytes.into());
        self
    }

    /// Make downloads of `bucket/path` fail with `error`
    pub fn with_failure(mut self, bucket: &str, path: &str, error: StorageError) -> Self {
        self.failures
            .insert((bucket.to_string(), path.to_string()), error);
        self
    }

    /// Signal cancellation on `sender` once `count` downloads have completed
    pub fn cancel_after(mut self, count: usize, sender: watch::Sender<bool>) -> Self {
        self.cancel_after = Some((count, sender));
        self
    }

    /// `bucket/path` of every download attempted, in call order
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn download(
        &self,
        bucket: &BucketName,
        path: &str,
    ) -> std::result::Result<Vec<u8>, StorageError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(format!("{bucket}/{path}"));
        }

        let key = (bucket.as_str().to_string(), path.to_string());
        let result = match self.failures.get(&key) {
            Some(error) => Err(error.clone()),
            None => self.objects.get(&key).cloned().ok_or_else(|| StorageError::NotFound {
                path: path.to_string(),
            }),
        };

        let completed = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some((count, sender)) = &self.cancel_after {
            if completed >= *count {
                let _ = sender.send(true);
            }
        }

        result
    }
}

/// Sessions held in memory, keyed by token
#[derive(Debug, Default)]
pub struct InMemorySessionVerifier {
    sessions: HashMap<String, AdminSession>,
}

impl InMemorySessionVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(mut self, token: &str, role: &str) -> Self {
        self.sessions.insert(
            token.to_string(),
            AdminSession {
                role: role.to_string(),
                user_id: None,
            },
        );
        self
    }
}

#[async_trait]
impl SessionVerifier for InMemorySessionVerifier {
    async fn verify(&self, token: &str) -> Result<Option<AdminSession>> {
        Ok(self.sessions.get(token).cloned())
    }
}
