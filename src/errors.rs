/*!
 * Error types for the polyglot crate.
 *
 * This module contains custom error types for the store boundary and the
 * query service, using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

use crate::database::models::ObjectKind;

/// Errors raised by a translation store
#[derive(Error, Debug)]
pub enum StoreError {
    /// Error reported by SQLite
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Error acquiring the shared connection
    #[error("Failed to acquire database lock: {0}")]
    Lock(String),

    /// Error turning a stored row into a typed value
    #[error("Failed to decode row: {0}")]
    Decode(String),

    /// Table or column name that is not a plain identifier
    #[error("Invalid SQL identifier: {0}")]
    InvalidIdentifier(String),

    /// Result shape did not match the requested query mode
    #[error("Unexpected result shape: expected {expected}, got {actual}")]
    UnexpectedShape {
        /// Shape the caller asked for
        expected: &'static str,
        /// Shape the store produced
        actual: &'static str,
    },
}

/// Errors surfaced by the query service
#[derive(Error, Debug)]
pub enum QueryError {
    /// The object kind has no translation path
    #[error("We don't know how to duplicate {0}.")]
    UnsupportedKind(ObjectKind),

    /// The content provider did not create the translated object
    #[error("Could not duplicate object #{original_id}: {reason}")]
    CreateObject {
        /// Object that was being translated
        original_id: i64,
        /// Provider failure description
        reason: String,
    },

    /// Writing or removing translation links failed.
    ///
    /// When the link insert fails after the translated object was created,
    /// `orphaned_object_id` holds the id of that object. It is left in place.
    #[error("Could not save translation data: {source}")]
    Persist {
        /// Object created before the failing write, if any
        orphaned_object_id: Option<i64>,
        /// Underlying store failure
        #[source]
        source: StoreError,
    },

    /// Reading from the store failed
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Main application error type used by the binary
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from the query service
    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    /// Error from the store
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Command line argument rejected before reaching the service
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Error rendering command output
    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
