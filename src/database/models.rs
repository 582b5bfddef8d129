/*!
 * Database entity models and query values.
 *
 * These structures map directly to the translations table and describe
 * the queries sent to a store and the results it hands back.
 */

use rusqlite::ToSql;
use rusqlite::types::{Null, ToSqlOutput};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::errors::StoreError;

/// Category of a content object, which decides how it is stored upstream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ObjectKind {
    /// Page, post or any other content item
    ContentItem,
    /// Term of a taxonomy
    TaxonomyTerm,
}

impl ObjectKind {
    /// Identifier persisted in the `obj_kind` column
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::ContentItem => "content-item",
            ObjectKind::TaxonomyTerm => "taxonomy-term",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ObjectKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "content-item" => Ok(ObjectKind::ContentItem),
            "taxonomy-term" => Ok(ObjectKind::TaxonomyTerm),
            _ => Err(anyhow::anyhow!("Invalid object kind: {}", s)),
        }
    }
}

/// Value bound to a `?` placeholder
#[derive(Debug, Clone, PartialEq)]
pub enum QueryParam {
    /// Integer value
    Int(i64),
    /// Text value
    Text(String),
    /// SQL NULL
    Null,
}

impl QueryParam {
    /// SQL literal used when rendering a query as text
    pub fn to_literal(&self) -> String {
        match self {
            QueryParam::Int(v) => v.to_string(),
            QueryParam::Text(v) => format!("'{}'", v.replace('\'', "''")),
            QueryParam::Null => "NULL".to_string(),
        }
    }
}

impl From<i64> for QueryParam {
    fn from(value: i64) -> Self {
        QueryParam::Int(value)
    }
}

impl From<&str> for QueryParam {
    fn from(value: &str) -> Self {
        QueryParam::Text(value.to_string())
    }
}

impl From<String> for QueryParam {
    fn from(value: String) -> Self {
        QueryParam::Text(value)
    }
}

impl From<ObjectKind> for QueryParam {
    fn from(value: ObjectKind) -> Self {
        QueryParam::Text(value.as_str().to_string())
    }
}

impl<T: Into<QueryParam>> From<Option<T>> for QueryParam {
    fn from(value: Option<T>) -> Self {
        value.map_or(QueryParam::Null, Into::into)
    }
}

impl ToSql for QueryParam {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            QueryParam::Int(v) => ToSqlOutput::from(*v),
            QueryParam::Text(v) => ToSqlOutput::from(v.as_str()),
            QueryParam::Null => ToSqlOutput::from(Null),
        })
    }
}

/// SQL text with positional `?` placeholders and the values bound to them
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedQuery {
    /// Statement text
    pub sql: String,
    /// Values for the placeholders, in order
    pub params: Vec<QueryParam>,
}

impl PreparedQuery {
    /// Create a query without parameters
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Append a placeholder value
    pub fn bind(mut self, param: impl Into<QueryParam>) -> Self {
        self.params.push(param.into());
        self
    }

    /// The statement with every placeholder replaced by its literal.
    ///
    /// Only used for identity and logging; execution always binds.
    pub fn rendered(&self) -> String {
        let mut params = self.params.iter();
        let mut out = String::with_capacity(self.sql.len() + self.params.len() * 8);

        for ch in self.sql.chars() {
            match ch {
                '?' => match params.next() {
                    Some(param) => out.push_str(&param.to_literal()),
                    None => out.push('?'),
                },
                _ => out.push(ch),
            }
        }

        out
    }
}

impl fmt::Display for PreparedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rendered())
    }
}

/// How the result of a query should be shaped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode {
    /// Every row
    Rows,
    /// The first row, if any
    SingleRow,
    /// The first column of the first row, if any
    Scalar,
}

/// A result row keyed by column name
pub type Row = serde_json::Map<String, Value>;

/// Result of a query, shaped by its [`QueryMode`]
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    /// All rows
    Rows(Vec<Row>),
    /// First row
    Row(Option<Row>),
    /// First value, `None` for no row or SQL NULL
    Scalar(Option<Value>),
}

impl QueryResult {
    /// Mode that produces this shape
    pub fn mode(&self) -> QueryMode {
        match self {
            QueryResult::Rows(_) => QueryMode::Rows,
            QueryResult::Row(_) => QueryMode::SingleRow,
            QueryResult::Scalar(_) => QueryMode::Scalar,
        }
    }

    fn shape(&self) -> &'static str {
        match self.mode() {
            QueryMode::Rows => "rows",
            QueryMode::SingleRow => "single-row",
            QueryMode::Scalar => "scalar",
        }
    }

    /// Take the rows of a `Rows` result
    pub fn into_rows(self) -> Result<Vec<Row>, StoreError> {
        match self {
            QueryResult::Rows(rows) => Ok(rows),
            other => Err(StoreError::UnexpectedShape {
                expected: "rows",
                actual: other.shape(),
            }),
        }
    }

    /// Take the row of a `Row` result
    pub fn into_row(self) -> Result<Option<Row>, StoreError> {
        match self {
            QueryResult::Row(row) => Ok(row),
            other => Err(StoreError::UnexpectedShape {
                expected: "single-row",
                actual: other.shape(),
            }),
        }
    }

    /// Take the value of a `Scalar` result
    pub fn into_scalar(self) -> Result<Option<Value>, StoreError> {
        match self {
            QueryResult::Scalar(value) => Ok(value),
            other => Err(StoreError::UnexpectedShape {
                expected: "scalar",
                actual: other.shape(),
            }),
        }
    }
}

/// Raw column layout of the translations table
#[derive(Debug, Deserialize)]
struct TranslationRow {
    #[serde(rename = "polyglot_ID")]
    polyglot_id: i64,
    obj_kind: String,
    obj_type: String,
    obj_id: i64,
    translation_of: Option<i64>,
    translation_locale: Option<String>,
}

/// Link between a translated object and its original
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationRecord {
    /// Store-assigned row id, `None` while unsaved
    pub record_id: Option<i64>,
    /// Object this record describes
    pub object_id: i64,
    /// Kind of the object
    pub object_kind: ObjectKind,
    /// Subtype within the kind (content type, taxonomy name)
    pub object_type: String,
    /// Original object, `None` when this record stands for the original
    pub translation_of: Option<i64>,
    /// Locale code of the object
    pub translation_locale: String,
    /// Slug of the object, when resolved
    #[serde(default)]
    pub object_slug: Option<String>,
}

impl TranslationRecord {
    /// Create an unsaved record for a translation of `translation_of`
    pub fn new_translation(
        object_id: i64,
        object_kind: ObjectKind,
        object_type: &str,
        translation_of: i64,
        translation_locale: &str,
    ) -> Self {
        Self {
            record_id: None,
            object_id,
            object_kind,
            object_type: object_type.to_string(),
            translation_of: Some(translation_of),
            translation_locale: translation_locale.to_string(),
            object_slug: None,
        }
    }

    /// Decode a row of the translations table.
    ///
    /// A NULL `translation_locale` decodes as `fallback_locale`, matching
    /// how locale lookups treat a missing value.
    pub fn from_row(row: &Row, fallback_locale: &str) -> Result<Self, StoreError> {
        let raw: TranslationRow = serde_json::from_value(Value::Object(row.clone()))
            .map_err(|e| StoreError::Decode(e.to_string()))?;

        let object_kind = raw
            .obj_kind
            .parse()
            .map_err(|e: anyhow::Error| StoreError::Decode(e.to_string()))?;

        let translation_locale = raw
            .translation_locale
            .unwrap_or_else(|| fallback_locale.to_string());

        Ok(Self {
            record_id: Some(raw.polyglot_id),
            object_id: raw.obj_id,
            object_kind,
            object_type: raw.obj_type,
            translation_of: raw.translation_of,
            translation_locale,
            object_slug: None,
        })
    }

    /// Whether the record exists in the store
    pub fn is_saved(&self) -> bool {
        self.record_id.is_some()
    }

    /// Whether the record describes an original rather than a translation
    pub fn is_original(&self) -> bool {
        self.translation_of.is_none()
    }

    /// Column values for inserting this record
    pub fn insert_values(&self) -> Vec<(&'static str, QueryParam)> {
        vec![
            ("obj_kind", self.object_kind.into()),
            ("obj_type", self.object_type.clone().into()),
            ("obj_id", self.object_id.into()),
            ("translation_of", self.translation_of.into()),
            ("translation_locale", self.translation_locale.clone().into()),
        ]
    }
}
