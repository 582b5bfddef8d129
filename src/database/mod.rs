/*!
 * Database module for persistent storage of translation links.
 *
 * This module provides SQLite-based persistence for:
 * - Translation records linking translated objects to their originals
 * - The schema version marker kept in the options table
 */

pub mod schema;
pub mod connection;
pub mod store;
pub mod models;

// Re-export main types
pub use connection::DatabaseConnection;
pub use models::{ObjectKind, PreparedQuery, QueryMode, QueryParam, QueryResult, Row, TranslationRecord};
pub use store::{SqliteStore, TranslationStore};
