//! Record set selection and document enumeration per export kind

use crate::config::TablesConfig;
use crate::domain::document::{DocumentCategory, DocumentReference};
use crate::domain::ids::TableName;
use crate::domain::record::column_as_key;
use crate::domain::{ExportKind, RecordSet, Row};
use std::collections::HashSet;

/// What a fetched table is used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableRole {
    ContactRequests,
    PropertyApplications,
    Properties,
    Cities,
    /// General document table (full backup)
    Documents,
    LeadDocuments,
    UserDocuments,
}

impl TableRole {
    /// Tables read by `kind`, in archive order
    pub fn for_kind(kind: ExportKind) -> &'static [TableRole] {
        match kind {
            ExportKind::FullBackup => &[
                TableRole::ContactRequests,
                TableRole::PropertyApplications,
                TableRole::Properties,
                TableRole::Cities,
                TableRole::Documents,
            ],
            ExportKind::LeadsExport => &[
                TableRole::ContactRequests,
                TableRole::PropertyApplications,
                TableRole::LeadDocuments,
                TableRole::UserDocuments,
            ],
        }
    }

    pub fn table<'a>(&self, tables: &'a TablesConfig) -> &'a TableName {
        match self {
            TableRole::ContactRequests => &tables.contact_requests,
            TableRole::PropertyApplications => &tables.property_applications,
            TableRole::Properties => &tables.properties,
            TableRole::Cities => &tables.cities,
            TableRole::Documents => &tables.documents,
            TableRole::LeadDocuments => &tables.lead_documents,
            TableRole::UserDocuments => &tables.user_documents,
        }
    }
}

/// Record sets of one run, in archive order
#[derive(Debug, Clone, Default)]
pub struct FetchedRecords {
    sets: Vec<(TableRole, RecordSet)>,
}

impl FetchedRecords {
    pub fn new(sets: Vec<(TableRole, RecordSet)>) -> Self {
        Self { sets }
    }

    pub fn get(&self, role: TableRole) -> Option<&RecordSet> {
        self.sets.iter().find(|(r, _)| *r == role).map(|(_, set)| set)
    }

    fn get_mut(&mut self, role: TableRole) -> Option<&mut RecordSet> {
        self.sets
            .iter_mut()
            .find(|(r, _)| *r == role)
            .map(|(_, set)| set)
    }

    pub fn sets(&self) -> impl Iterator<Item = &RecordSet> {
        self.sets.iter().map(|(_, set)| set)
    }

    /// Row count of a role, zero when absent
    pub fn count(&self, role: TableRole) -> usize {
        self.get(role).map_or(0, RecordSet::len)
    }

    /// Keep only user documents of users who filed at least one application
    ///
    /// Applications with a null `user_id` contribute nothing. Returns the
    /// number of rows removed.
    pub fn retain_applicant_user_documents(&mut self) -> usize {
        let applicants: HashSet<String> = self
            .get(TableRole::PropertyApplications)
            .map(|apps| {
                apps.rows()
                    .iter()
                    .filter_map(|row| column_as_key(row, "user_id"))
                    .collect()
            })
            .unwrap_or_default();

        match self.get_mut(TableRole::UserDocuments) {
            Some(docs) => {
                let before = docs.len();
                docs.retain(|row| {
                    column_as_key(row, "user_id").is_some_and(|user| applicants.contains(&user))
                });
                before - docs.len()
            }
            None => 0,
        }
    }
}

/// Document references of a run plus the rows that could not form one
#[derive(Debug, Clone, Default)]
pub struct DocumentEnumeration {
    pub references: Vec<DocumentReference>,
    /// One label per unusable metadata row: its `file_path` when present,
    /// otherwise `<table>/<id>` or `<table>/row <index>`
    pub unresolved: Vec<String>,
}

impl DocumentEnumeration {
    fn push(&mut self, set: &RecordSet, index: usize, row: &Row, reference: Result<DocumentReference, String>) {
        match reference {
            Ok(doc) => self.references.push(doc),
            Err(reason) => {
                let label = column_as_key(row, "file_path")
                    .or_else(|| column_as_key(row, "id").map(|id| format!("{}/{id}", set.name())))
                    .unwrap_or_else(|| format!("{}/row {index}", set.name()));
                tracing::warn!(
                    table = %set.name(),
                    document = %label,
                    reason = %reason,
                    "Skipping unusable document row"
                );
                self.unresolved.push(label);
            }
        }
    }
}

/// Build the document references of a run
///
/// References are de-duplicated by `(category, id)`; the first occurrence
/// wins. Rows lacking `id` or `file_path` end up in
/// [`DocumentEnumeration::unresolved`] instead of aborting the run.
pub fn enumerate_documents(kind: ExportKind, records: &FetchedRecords) -> DocumentEnumeration {
    let mut found = DocumentEnumeration::default();

    match kind {
        ExportKind::FullBackup => {
            if let Some(docs) = records.get(TableRole::Documents) {
                for (index, row) in docs.rows().iter().enumerate() {
                    let reference = if column_as_key(row, "user_id").is_some() {
                        DocumentReference::from_row(row, DocumentCategory::Users, "user_id")
                    } else {
                        DocumentReference::from_row(row, DocumentCategory::Leads, "contact_request_id")
                    };
                    found.push(docs, index, row, reference);
                }
            }
        }
        ExportKind::LeadsExport => {
            if let Some(docs) = records.get(TableRole::LeadDocuments) {
                for (index, row) in docs.rows().iter().enumerate() {
                    let reference =
                        DocumentReference::from_row(row, DocumentCategory::Leads, "contact_request_id");
                    found.push(docs, index, row, reference);
                }
            }
            if let Some(docs) = records.get(TableRole::UserDocuments) {
                for (index, row) in docs.rows().iter().enumerate() {
                    let reference = DocumentReference::from_row(row, DocumentCategory::Users, "user_id");
                    found.push(docs, index, row, reference);
                }
            }
        }
    }

    let mut seen = HashSet::new();
    let before = found.references.len();
    found
        .references
        .retain(|doc| seen.insert((doc.category, doc.id.clone())));
    if found.references.len() < before {
        tracing::warn!(
            duplicates = before - found.references.len(),
            "Skipped duplicate document references"
        );
    }

    found
}
