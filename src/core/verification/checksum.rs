//! SHA-256 checksums of archive entries
//!
//! The manifest lists one checksum per entry so a restored backup can be
//! checked file by file.

use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Calculate the SHA-256 checksum of raw bytes
///
/// Returns a hex-encoded SHA-256 checksum string (64 characters).
///
/// # Examples
///
/// ```
/// use rental_backup::core::verification::checksum::calculate_checksum_bytes;
///
/// let checksum = calculate_checksum_bytes(b"id,name\n");
/// assert_eq!(checksum.len(), 64);
/// ```
pub fn calculate_checksum_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// Entry path → checksum, ordered by path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChecksumSet {
    checksums: BTreeMap<String, String>,
}

impl ChecksumSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hash `data` and record it under `path`
    pub fn record(&mut self, path: impl Into<String>, data: &[u8]) {
        self.checksums
            .insert(path.into(), calculate_checksum_bytes(data));
    }

    /// Record an already computed checksum under `path`
    pub fn insert(&mut self, path: impl Into<String>, checksum: String) {
        self.checksums.insert(path.into(), checksum);
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.checksums.get(path).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.checksums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checksums.is_empty()
    }

    pub fn into_map(self) -> BTreeMap<String, String> {
        self.checksums
    }
}
