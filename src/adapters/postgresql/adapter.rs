//! PostgreSQL adapter implementing the relational capabilities

use crate::adapters::database::traits::{AdminSession, RecordSource, SessionVerifier};
use crate::adapters::postgresql::client::PostgreSQLClient;
use crate::domain::ids::TableName;
use crate::domain::{BackupError, RecordSet, Result, Row};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// PostgreSQL implementation of [`RecordSource`] and [`SessionVerifier`]
pub struct PostgreSQLAdapter {
    client: Arc<PostgreSQLClient>,
    session_table: Option<TableName>,
}

impl PostgreSQLAdapter {
    pub fn new(client: PostgreSQLClient) -> Self {
        Self::new_with_arc(Arc::new(client))
    }

    pub fn new_with_arc(client: Arc<PostgreSQLClient>) -> Self {
        Self {
            client,
            session_table: None,
        }
    }

    /// Table consulted by [`SessionVerifier::verify`]
    pub fn with_session_table(mut self, table: TableName) -> Self {
        self.session_table = Some(table);
        self
    }

    pub fn client(&self) -> &Arc<PostgreSQLClient> {
        &self.client
    }
}

/// Whole-table query returning one JSON object per row
///
/// `row_to_json` keeps the table's column order.
pub(crate) fn table_query(table: &TableName) -> String {
    format!(
        "SELECT row_to_json(t)::text FROM (SELECT * FROM {} ORDER BY created_at DESC) t",
        table.quoted()
    )
}

pub(crate) fn session_query(table: &TableName) -> String {
    format!(
        "SELECT role, user_id::text FROM {} WHERE token = $1 AND expires_at > now() LIMIT 1",
        table.quoted()
    )
}

/// Parse one `row_to_json` value into a row
pub(crate) fn parse_row_json(table: &TableName, raw: &str) -> Result<Row> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(row)) => Ok(row),
        Ok(other) => Err(BackupError::Database(format!(
            "Unexpected row shape from {table}: {other}"
        ))),
        Err(e) => Err(BackupError::Database(format!(
            "Failed to decode row from {table}: {e}"
        ))),
    }
}

#[async_trait]
impl RecordSource for PostgreSQLAdapter {
    async fn test_connection(&self) -> Result<()> {
        self.client.test_connection().await
    }

    async fn fetch_table(&self, table: &TableName) -> Result<RecordSet> {
        let rows = self
            .client
            .query(&table_query(table), &[])
            .await
            .map_err(|e| BackupError::Database(format!("Failed to read {table}: {e}")))?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let raw: String = row
                .try_get(0)
                .map_err(|e| BackupError::Database(format!("Failed to read {table}: {e}")))?;
            records.push(parse_row_json(table, &raw)?);
        }

        tracing::debug!(table = %table, rows = records.len(), "Fetched table");
        Ok(RecordSet::new(table.base_name(), records))
    }
}

#[async_trait]
impl SessionVerifier for PostgreSQLAdapter {
    async fn verify(&self, token: &str) -> Result<Option<AdminSession>> {
        let table = self.session_table.as_ref().ok_or_else(|| {
            BackupError::Configuration("No session table configured".to_string())
        })?;

        let rows = self.client.query(&session_query(table), &[&token]).await?;
        let Some(row) = rows.first() else {
            return Ok(None);
        };

        let role: String = row
            .try_get(0)
            .map_err(|e| BackupError::Database(format!("Failed to read session role: {e}")))?;
        let user_id: Option<String> = row
            .try_get(1)
            .map_err(|e| BackupError::Database(format!("Failed to read session user: {e}")))?;

        Ok(Some(AdminSession { role, user_id }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_query_quotes_identifier() {
        let table = TableName::new("public.contact_requests").unwrap();
        assert_eq!(
            table_query(&table),
            "SELECT row_to_json(t)::text FROM (SELECT * FROM \"public\".\"contact_requests\" ORDER BY created_at DESC) t"
        );
    }

    #[test]
    fn test_session_query_is_parameterized() {
        let table = TableName::new("admin_sessions").unwrap();
        let sql = session_query(&table);
        assert!(sql.contains("\"admin_sessions\""));
        assert!(sql.contains("token = $1"));
    }

    #[test]
    fn test_parse_row_json_keeps_column_order() {
        let table = TableName::new("cities").unwrap();
        let row = parse_row_json(&table, r#"{"id":3,"name":"Faro","created_at":"2024-01-01"}"#)
            .unwrap();
        let keys: Vec<&str> = row.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["id", "name", "created_at"]);
    }

    #[test]
    fn test_parse_row_json_rejects_non_objects() {
        let table = TableName::new("cities").unwrap();
        assert!(parse_row_json(&table, "[1,2]").is_err());
        assert!(parse_row_json(&table, "{broken").is_err());
    }
}
