//! In-memory ZIP assembly
//!
//! Entries are collected in memory and written, in insertion order, when the
//! builder is finalized. Paths are unique: adding a path twice is an error.

use crate::domain::{ArchiveError, Result};
use std::collections::HashSet;
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Entry payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryContent {
    Text(String),
    Binary(Vec<u8>),
}

impl EntryContent {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            EntryContent::Text(text) => text.as_bytes(),
            EntryContent::Binary(bytes) => bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }
}

/// Named archive member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub path: String,
    pub content: EntryContent,
}

impl ArchiveEntry {
    pub fn text(path: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: EntryContent::Text(text.into()),
        }
    }

    pub fn binary(path: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            content: EntryContent::Binary(bytes),
        }
    }
}

/// Accumulates entries and produces one deflate-compressed ZIP buffer
///
/// # Examples
///
/// ```
/// use rental_backup::core::archive::ArchiveBuilder;
///
/// let mut builder = ArchiveBuilder::new();
/// builder.add_text("data/cities.csv", "id,name\n1,Lisbon\n").unwrap();
/// assert!(builder.add_text("data/cities.csv", "again").is_err());
///
/// let bytes = builder.finalize().unwrap();
/// assert_eq!(&bytes[..2], b"PK");
/// ```
#[derive(Debug, Default)]
pub struct ArchiveBuilder {
    entries: Vec<ArchiveEntry>,
    paths: HashSet<String>,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a UTF-8 text entry
    ///
    /// # Errors
    ///
    /// See [`add_entry`](Self::add_entry).
    pub fn add_text(&mut self, path: impl Into<String>, text: impl Into<String>) -> Result<()> {
        self.add_entry(ArchiveEntry::text(path, text))
    }

    /// Add a binary entry
    ///
    /// # Errors
    ///
    /// See [`add_entry`](Self::add_entry).
    pub fn add_binary(&mut self, path: impl Into<String>, bytes: Vec<u8>) -> Result<()> {
        self.add_entry(ArchiveEntry::binary(path, bytes))
    }

    /// Add an entry
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::DuplicatePath`] if the path is already present and
    /// [`ArchiveError::InvalidPath`] for empty, absolute or `..` paths.
    pub fn add_entry(&mut self, entry: ArchiveEntry) -> Result<()> {
        validate_path(&entry.path)?;
        if !self.paths.insert(entry.path.clone()) {
            return Err(ArchiveError::DuplicatePath(entry.path).into());
        }
        self.entries.push(entry);
        Ok(())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order
    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    /// Write every entry and return the archive bytes
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::WriteFailed`] if compression fails.
    pub fn finalize(self) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(0o644);

        for entry in &self.entries {
            zip.start_file(entry.path.as_str(), options)
                .map_err(ArchiveError::from)?;
            zip.write_all(entry.content.as_bytes()).map_err(|e| {
                ArchiveError::WriteFailed(format!("Failed to write {}: {}", entry.path, e))
            })?;
        }

        let cursor = zip.finish().map_err(ArchiveError::from)?;
        tracing::debug!(
            entries = self.entries.len(),
            bytes = cursor.get_ref().len(),
            "Archive finalized"
        );
        Ok(cursor.into_inner())
    }
}

fn validate_path(path: &str) -> std::result::Result<(), ArchiveError> {
    if path.trim().is_empty() {
        return Err(ArchiveError::InvalidPath("empty path".to_string()));
    }
    if path.starts_with('/') || path.starts_with('\\') {
        return Err(ArchiveError::InvalidPath(path.to_string()));
    }
    if path.split(['/', '\\']).any(|segment| segment == ".." || segment.is_empty()) {
        return Err(ArchiveError::InvalidPath(path.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BackupError;
    use std::io::Read;

    fn read_back(bytes: Vec<u8>) -> Vec<(String, Vec<u8>)> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        (0..archive.len())
            .map(|i| {
                let mut file = archive.by_index(i).unwrap();
                let mut content = Vec::new();
                file.read_to_end(&mut content).unwrap();
                (file.name().to_string(), content)
            })
            .collect()
    }

    #[test]
    fn test_finalize_preserves_insertion_order_and_content() {
        let mut builder = ArchiveBuilder::new();
        builder.add_text("data/contact_requests.csv", "id\n1\n").unwrap();
        builder
            .add_binary("documents/leads/c1/id_card/a.pdf", vec![0x25, 0x50, 0x44, 0x46])
            .unwrap();
        builder.add_text("backup_info.json", "{}").unwrap();
        assert_eq!(builder.len(), 3);
        assert!(builder.contains("backup_info.json"));

        let members = read_back(builder.finalize().unwrap());
        let names: Vec<&str> = members.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "data/contact_requests.csv",
                "documents/leads/c1/id_card/a.pdf",
                "backup_info.json"
            ]
        );
        assert_eq!(members[0].1, b"id\n1\n");
        assert_eq!(members[1].1, vec![0x25, 0x50, 0x44, 0x46]);
    }

    #[test]
    fn test_entries_are_deflated() {
        let mut builder = ArchiveBuilder::new();
        builder.add_text("data/cities.csv", "Lisbon\n".repeat(500)).unwrap();
        let bytes = builder.finalize().unwrap();

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let file = archive.by_index(0).unwrap();
        assert_eq!(file.compression(), CompressionMethod::Deflated);
        assert!(file.compressed_size() < file.size());
    }

    #[test]
    fn test_duplicate_path_rejected() {
        let mut builder = ArchiveBuilder::new();
        builder.add_text("data/a.csv", "x").unwrap();
        let err = builder.add_binary("data/a.csv", vec![1]).unwrap_err();
        assert!(matches!(
            err,
            BackupError::Archive(ArchiveError::DuplicatePath(ref p)) if p == "data/a.csv"
        ));
        assert_eq!(builder.len(), 1);
    }

    #[test]
    fn test_invalid_paths_rejected() {
        let mut builder = ArchiveBuilder::new();
        for path in ["", "/etc/passwd", "documents/../x", "a//b"] {
            assert!(
                matches!(
                    builder.add_text(path, "x"),
                    Err(BackupError::Archive(ArchiveError::InvalidPath(_)))
                ),
                "{path} should be rejected"
            );
        }
        assert!(builder.is_empty());
    }

    #[test]
    fn test_empty_archive_is_valid_zip() {
        let members = read_back(ArchiveBuilder::new().finalize().unwrap());
        assert!(members.is_empty());
    }
}
