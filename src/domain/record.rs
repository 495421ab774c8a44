//! Record sets returned by relational queries

use serde_json::{Map, Value};

/// One row: column name → scalar value, in the column order of the query
pub type Row = Map<String, Value>;

/// Ordered rows that share one column set, named after their source table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    name: String,
    rows: Vec<Row>,
}

impl RecordSet {
    /// Create a record set
    pub fn new(name: impl Into<String>, rows: Vec<Row>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    /// Create an empty record set
    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }

    /// Name used for the `data/<name>.csv` entry and manifest counts
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Columns of the first row; empty for an empty set
    pub fn columns(&self) -> Vec<&str> {
        self.rows
            .first()
            .map(|row| row.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Keep only rows matching `predicate`, preserving order
    pub fn retain<F>(&mut self, predicate: F)
    where
        F: FnMut(&Row) -> bool,
    {
        self.rows.retain(predicate);
    }
}

/// Read a column as an owned string key
///
/// Strings are returned as-is and numbers via their display form, so numeric
/// and text identifiers compare alike. Null, missing, or empty values yield `None`.
pub fn column_as_key(row: &Row, column: &str) -> Option<String> {
    match row.get(column)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
