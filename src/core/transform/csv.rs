//! CSV rendering of record sets
//!
//! The header is the column list of the first row. Every row is rendered in
//! header order, so a column missing from a later row becomes an empty field.
//! Fields are quoted only when they contain a comma, a double quote, CR or LF,
//! with inner quotes doubled. Lines end with `\n` and the output ends with a
//! newline, so N rows render as N+1 lines.

use crate::domain::{BackupError, RecordSet, Result};
use ::csv::{QuoteStyle, Terminator, WriterBuilder};
use serde_json::Value;

/// Render a record set as CSV text
///
/// An empty set renders as the empty string.
///
/// # Errors
///
/// Returns [`BackupError::Csv`] if the writer fails.
///
/// # Examples
///
/// ```
/// use rental_backup::core::transform::to_csv;
/// use rental_backup::domain::RecordSet;
/// use serde_json::json;
///
/// let row = json!({"id": 1, "note": "a,b\"c"}).as_object().unwrap().clone();
/// let csv = to_csv(&RecordSet::new("contact_requests", vec![row])).unwrap();
/// assert_eq!(csv, "id,note\n1,\"a,b\"\"c\"\n");
/// ```
pub fn to_csv(set: &RecordSet) -> Result<String> {
    if set.is_empty() {
        return Ok(String::new());
    }

    let columns = set.columns();
    if columns.is_empty() {
        // rows without any column: header and rows are all blank lines
        return Ok("\n".repeat(set.len() + 1));
    }

    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(&columns)?;

    for row in set.rows() {
        let fields: Vec<String> = columns
            .iter()
            .map(|column| render_value(row.get(*column)))
            .collect();
        writer.write_record(&fields)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| BackupError::Csv(format!("Failed to flush CSV writer: {e}")))?;

    String::from_utf8(bytes).map_err(|e| BackupError::Csv(format!("CSV output is not UTF-8: {e}")))
}

/// Render one cell before quoting
///
/// Missing and null values are empty; nested arrays and objects are compact JSON.
pub fn render_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(nested @ (Value::Array(_) | Value::Object(_))) => nested.to_string(),
    }
}
