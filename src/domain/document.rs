//! Document references: metadata rows pointing at stored binary objects

use super::record::{column_as_key, Row};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder owner segment for documents whose owner column is null
pub const UNASSIGNED_OWNER: &str = "unassigned";

/// Who a document belongs to; selects the bucket and the archive prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentCategory {
    /// Attached directly to a contact request
    Leads,
    /// Uploaded by a registered user
    Users,
}

impl DocumentCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentCategory::Leads => "leads",
            DocumentCategory::Users => "users",
        }
    }
}

impl fmt::Display for DocumentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata of one stored document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentReference {
    pub id: String,
    /// Contact request id (leads) or user id (users)
    pub owner_key: String,
    pub category: DocumentCategory,
    pub document_type: String,
    pub file_name: String,
    /// Object path inside the category's bucket
    pub file_path: String,
    pub uploaded_at: Option<String>,
}

impl DocumentReference {
    /// Build a reference from a metadata row
    ///
    /// `id` and `file_path` are required. `file_name` falls back to the last
    /// segment of `file_path`, `document_type` to `other`, and `uploaded_at`
    /// to `created_at`.
    ///
    /// # Errors
    ///
    /// Returns a description of the missing column.
    pub fn from_row(
        row: &Row,
        category: DocumentCategory,
        owner_column: &str,
    ) -> Result<Self, String> {
        let id = column_as_key(row, "id").ok_or("document row has no id")?;
        let file_path = column_as_key(row, "file_path")
            .ok_or_else(|| format!("document {id} has no file_path"))?;

        let file_name = column_as_key(row, "file_name").unwrap_or_else(|| {
            file_path
                .rsplit('/')
                .next()
                .unwrap_or(file_path.as_str())
                .to_string()
        });

        let owner_key =
            column_as_key(row, owner_column).unwrap_or_else(|| UNASSIGNED_OWNER.to_string());

        Ok(Self {
            id,
            owner_key,
            category,
            document_type: column_as_key(row, "document_type")
                .unwrap_or_else(|| "other".to_string()),
            file_name,
            file_path,
            uploaded_at: column_as_key(row, "uploaded_at")
                .or_else(|| column_as_key(row, "created_at")),
        })
    }

    /// `documents/<category>/<owner_key>/<document_type>/<file_name>`
    pub fn archive_path(&self) -> String {
        self.archive_path_with_name(&self.file_name)
    }

    /// Same as [`archive_path`](Self::archive_path) with the id prefixed to
    /// the file name, used when two references collide on one path
    pub fn disambiguated_archive_path(&self) -> String {
        self.archive_path_with_name(&format!("{}_{}", self.id, self.file_name))
    }

    fn archive_path_with_name(&self, file_name: &str) -> String {
        format!(
            "documents/{}/{}/{}/{}",
            self.category,
            sanitize_segment(&self.owner_key),
            sanitize_segment(&self.document_type),
            sanitize_segment(file_name)
        )
    }
}

/// Make a value safe to use as one archive path segment
fn sanitize_segment(segment: &str) -> String {
    let cleaned: String = segment
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c => c,
        })
        .collect();
    let trimmed = cleaned.trim();
    if trimmed.is_empty() || trimmed == "." || trimmed == ".." {
        "_".to_string()
    } else {
        trimmed.to_string()
    }
}
