/*!
 * Database schema definitions and migrations.
 *
 * This module contains the SQL for the translations table and the
 * key-value options table that carries the schema version marker.
 */

use log::{debug, info};
use rusqlite::{Connection, OptionalExtension};

use crate::errors::StoreError;

/// Current schema version, persisted as an option value
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Option key holding the schema version
pub const VERSION_OPTION: &str = "polyglot_db_version";

/// Table names derived from a prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNames {
    /// Translation links
    pub translations: String,
    /// Key-value settings
    pub options: String,
}

impl TableNames {
    /// Build table names for `prefix`
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            translations: format!("{}polyglot", prefix),
            options: format!("{}options", prefix),
        }
    }
}

/// Create or upgrade the schema. Safe to call repeatedly.
pub fn initialize_schema(conn: &Connection, tables: &TableNames) -> Result<(), StoreError> {
    create_options_table(conn, tables)?;
    let current_version = get_schema_version(conn, tables)?;

    match current_version.as_deref() {
        None => {
            info!("Initializing polyglot schema v{}", SCHEMA_VERSION);
            create_translations_table(conn, tables)?;
            // add_option semantics: only written when absent
            set_schema_version(conn, tables, SCHEMA_VERSION)?;
        }
        Some(version) if version != SCHEMA_VERSION => {
            info!(
                "Upgrading polyglot schema from v{} to v{}",
                version, SCHEMA_VERSION
            );
            create_translations_table(conn, tables)?;
        }
        Some(_) => {
            // Table may have been dropped while the option survived
            create_translations_table(conn, tables)?;
            debug!("Polyglot schema is up to date (v{})", SCHEMA_VERSION);
        }
    }

    Ok(())
}

/// Read the persisted schema version, if any
pub fn get_schema_version(
    conn: &Connection,
    tables: &TableNames,
) -> Result<Option<String>, StoreError> {
    let version = conn
        .query_row(
            &format!("SELECT option_value FROM {} WHERE option_name = ?1", tables.options),
            [VERSION_OPTION],
            |row| row.get(0),
        )
        .optional()?;

    Ok(version)
}

fn set_schema_version(conn: &Connection, tables: &TableNames, version: &str) -> Result<(), StoreError> {
    conn.execute(
        &format!(
            "INSERT OR IGNORE INTO {} (option_name, option_value) VALUES (?1, ?2)",
            tables.options
        ),
        [VERSION_OPTION, version],
    )?;
    Ok(())
}

fn create_options_table(conn: &Connection, tables: &TableNames) -> Result<(), StoreError> {
    conn.execute_batch(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {options} (
            option_name TEXT PRIMARY KEY,
            option_value TEXT NOT NULL
        );
        "#,
        options = tables.options
    ))?;
    Ok(())
}

fn create_translations_table(conn: &Connection, tables: &TableNames) -> Result<(), StoreError> {
    conn.execute_batch(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {t} (
            polyglot_ID INTEGER PRIMARY KEY AUTOINCREMENT,
            obj_kind VARCHAR(16) NOT NULL,
            obj_type TEXT NOT NULL,
            obj_id INTEGER NOT NULL,
            translation_of INTEGER NOT NULL,
            translation_locale VARCHAR(10)
        );

        CREATE INDEX IF NOT EXISTS idx_{t}_object ON {t}(obj_id, obj_kind);
        CREATE INDEX IF NOT EXISTS idx_{t}_original ON {t}(translation_of, obj_kind);
        "#,
        t = tables.translations
    ))?;
    Ok(())
}

/// Drop all tables (for testing purposes only)
#[cfg(test)]
pub fn drop_all_tables(conn: &Connection, tables: &TableNames) -> Result<(), StoreError> {
    conn.execute_batch(&format!(
        "DROP TABLE IF EXISTS {}; DROP TABLE IF EXISTS {};",
        tables.translations, tables.options
    ))?;
    Ok(())
}
