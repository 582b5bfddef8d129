/*!
 * # Polyglot - translation links for content objects
 *
 * A Rust library that records which content objects are translations of
 * which originals, and answers locale questions about them through a
 * cache that sits in front of a relational store.
 *
 * ## Features
 *
 * - Link translated objects to their default-locale originals
 * - Resolve the locale of any object, falling back to the default locale
 * - List every translation of an original, or every sibling of a translation
 * - Build the per-locale slug list of a static front page
 * - Serve repeated identical queries from memory
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `database`: SQLite persistence:
 *   - `database::models`: Records, query parameters and results
 *   - `database::schema`: Table creation and the version marker
 *   - `database::store`: The `TranslationStore` boundary and its SQLite implementation
 * - `query`: The cached query layer:
 *   - `query::cache`: Query result cache
 *   - `query::service`: The `QueryService` orchestrator
 * - `providers`: Interfaces to the surrounding CMS and an in-memory implementation
 * - `errors`: Custom error types for the library
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]

// Public modules
pub mod app_config;
pub mod database;
pub mod errors;
pub mod providers;
pub mod query;

// Re-export main types for easier usage
pub use app_config::Config;
pub use database::{ObjectKind, SqliteStore, TranslationRecord, TranslationStore};
pub use errors::{AppError, QueryError, StoreError};
pub use providers::{ContentObject, ContentProvider, LocaleProvider, MemoryContentProvider, SiteSettings};
pub use query::{QueryCache, QueryService, TranslationDetails};
