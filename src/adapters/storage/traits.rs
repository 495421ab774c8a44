//! Object storage capability

use crate::domain::{BucketName, StorageError};
use async_trait::async_trait;

/// Downloads stored objects
///
/// Failures are values, not aborts: the export pipeline records each
/// [`StorageError`] against the document and carries on.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch the bytes stored at `path` in `bucket`
    async fn download(&self, bucket: &BucketName, path: &str) -> Result<Vec<u8>, StorageError>;
}
