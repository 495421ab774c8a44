//! Per-document downloads with isolated failures

use crate::adapters::storage::ObjectStore;
use crate::domain::document::{DocumentCategory, DocumentReference};
use crate::domain::{BucketName, StorageError};
use futures::stream::{self, StreamExt};
use tokio::sync::watch;

/// Result of one download attempt
#[derive(Debug)]
pub enum DownloadOutcome {
    Downloaded(DocumentReference, Vec<u8>),
    Failed(DocumentReference, StorageError),
    /// Not started because cancellation was signalled
    Skipped(DocumentReference),
}

/// Bucket per document category
#[derive(Debug, Clone)]
pub struct BucketMap {
    pub leads: BucketName,
    pub users: BucketName,
}

impl BucketMap {
    pub fn for_category(&self, category: DocumentCategory) -> &BucketName {
        match category {
            DocumentCategory::Leads => &self.leads,
            DocumentCategory::Users => &self.users,
        }
    }
}

/// Download every reference, at most `concurrency` at a time
///
/// Outcomes come back in reference order whatever the concurrency. Once
/// `cancel` reads `true`, downloads not yet started are skipped.
pub async fn download_all(
    store: &dyn ObjectStore,
    buckets: &BucketMap,
    references: Vec<DocumentReference>,
    concurrency: usize,
    cancel: &watch::Receiver<bool>,
) -> Vec<DownloadOutcome> {
    stream::iter(references)
        .map(|doc| async move {
            if *cancel.borrow() {
                return DownloadOutcome::Skipped(doc);
            }
            let bucket = buckets.for_category(doc.category);
            match store.download(bucket, &doc.file_path).await {
                Ok(bytes) => DownloadOutcome::Downloaded(doc, bytes),
                Err(e) => DownloadOutcome::Failed(doc, e),
            }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await
}
