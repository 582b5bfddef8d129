/*!
 * Store layer for translation links.
 *
 * This module defines the persistence boundary consumed by the query
 * service and its SQLite implementation. Every value reaches SQLite as a
 * bound parameter; only validated identifiers are spliced into SQL text.
 */

use anyhow::Result;
use log::debug;
use rusqlite::types::ValueRef;
use serde_json::Value;
use std::path::Path;

use super::connection::DatabaseConnection;
use super::models::{PreparedQuery, QueryMode, QueryParam, QueryResult, Row};
use super::schema::{self, TableNames};
use crate::errors::StoreError;

/// Relational persistence boundary for translation links
pub trait TranslationStore: Send + Sync {
    /// Name of the translations table
    fn translations_table(&self) -> &str;

    /// Run a query and shape its result according to `mode`
    fn execute(&self, query: &PreparedQuery, mode: QueryMode) -> Result<QueryResult, StoreError>;

    /// Insert one row and return its id
    fn insert(&self, table: &str, values: &[(&str, QueryParam)]) -> Result<i64, StoreError>;

    /// Delete rows matching every criterion and return the affected count
    fn delete(&self, table: &str, criteria: &[(&str, QueryParam)]) -> Result<usize, StoreError>;

    /// Create or upgrade the schema
    fn create_schema(&self) -> Result<(), StoreError>;
}

/// SQLite-backed translation store
#[derive(Clone)]
pub struct SqliteStore {
    /// Database connection
    db: DatabaseConnection,
    /// Prefixed table names
    tables: TableNames,
}

impl SqliteStore {
    /// Create a store over an existing connection
    pub fn new(db: DatabaseConnection, table_prefix: &str) -> Self {
        Self {
            db,
            tables: TableNames::with_prefix(table_prefix),
        }
    }

    /// Open a store backed by a database file
    pub fn open<P: AsRef<Path>>(path: P, table_prefix: &str) -> Result<Self> {
        let db = DatabaseConnection::new(path)?;
        Ok(Self::new(db, table_prefix))
    }

    /// Open a store with an in-memory database (for testing)
    pub fn open_in_memory(table_prefix: &str) -> Result<Self> {
        let db = DatabaseConnection::new_in_memory()?;
        Ok(Self::new(db, table_prefix))
    }

    /// Underlying connection
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl TranslationStore for SqliteStore {
    fn translations_table(&self) -> &str {
        &self.tables.translations
    }

    fn execute(&self, query: &PreparedQuery, mode: QueryMode) -> Result<QueryResult, StoreError> {
        self.db.execute(|conn| {
            let mut stmt = conn.prepare(&query.sql)?;
            let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
            let mut rows = stmt.query(rusqlite::params_from_iter(query.params.iter()))?;

            let result = match mode {
                QueryMode::Rows => {
                    let mut collected = Vec::new();
                    while let Some(row) = rows.next()? {
                        collected.push(row_to_map(row, &columns)?);
                    }
                    QueryResult::Rows(collected)
                }
                QueryMode::SingleRow => match rows.next()? {
                    Some(row) => QueryResult::Row(Some(row_to_map(row, &columns)?)),
                    None => QueryResult::Row(None),
                },
                QueryMode::Scalar => match rows.next()? {
                    Some(row) if !columns.is_empty() => {
                        let value = value_to_json(row.get_ref(0)?);
                        QueryResult::Scalar((!value.is_null()).then_some(value))
                    }
                    _ => QueryResult::Scalar(None),
                },
            };

            Ok(result)
        })
    }

    fn insert(&self, table: &str, values: &[(&str, QueryParam)]) -> Result<i64, StoreError> {
        check_identifier(table)?;
        let mut columns = Vec::with_capacity(values.len());
        for (column, _) in values {
            check_identifier(column)?;
            columns.push(*column);
        }

        let placeholders = vec!["?"; values.len()].join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            columns.join(", "),
            placeholders
        );

        self.db.execute(|conn| {
            conn.execute(&sql, rusqlite::params_from_iter(values.iter().map(|(_, v)| v)))?;
            let id = conn.last_insert_rowid();
            debug!("Inserted row #{} into {}", id, table);
            Ok(id)
        })
    }

    fn delete(&self, table: &str, criteria: &[(&str, QueryParam)]) -> Result<usize, StoreError> {
        check_identifier(table)?;
        if criteria.is_empty() {
            // Never turn a missing criterion into a full-table delete
            return Ok(0);
        }

        let mut clauses = Vec::with_capacity(criteria.len());
        for (column, _) in criteria {
            check_identifier(column)?;
            clauses.push(format!("{} = ?", column));
        }

        let sql = format!("DELETE FROM {} WHERE {}", table, clauses.join(" AND "));

        self.db.execute(|conn| {
            let deleted =
                conn.execute(&sql, rusqlite::params_from_iter(criteria.iter().map(|(_, v)| v)))?;
            debug!("Deleted {} row(s) from {}", deleted, table);
            Ok(deleted)
        })
    }

    fn create_schema(&self) -> Result<(), StoreError> {
        self.db
            .transaction(|tx| schema::initialize_schema(tx, &self.tables))
    }
}

/// Accept only `[A-Za-z0-9_]+` as table or column name
fn check_identifier(name: &str) -> Result<(), StoreError> {
    let valid = !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidIdentifier(name.to_string()))
    }
}

fn row_to_map(row: &rusqlite::Row<'_>, columns: &[String]) -> Result<Row, StoreError> {
    let mut map = Row::new();
    for (index, name) in columns.iter().enumerate() {
        map.insert(name.clone(), value_to_json(row.get_ref(index)?));
    }
    Ok(map)
}

fn value_to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f).map_or(Value::Null, Value::Number),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::from(bytes.to_vec()),
    }
}
