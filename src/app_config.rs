use anyhow::{Context, Result, anyhow};
use isolang::Language;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::{Path, PathBuf};

use crate::providers::{LocaleProvider, SiteSettings};

/// Application configuration module
/// This module handles loading and validating the configuration that
/// stands in for the CMS options: table prefix, default locale and the
/// front page settings.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Database settings
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Locale settings
    #[serde(default)]
    pub i18n: I18nConfig,

    /// Front page settings
    #[serde(default)]
    pub site: SiteConfig,

    /// Query cache settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Database configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// Database file, defaults to the user's data directory
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Prefix prepended to every table name
    #[serde(default = "default_table_prefix")]
    pub table_prefix: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            table_prefix: default_table_prefix(),
        }
    }
}

/// Locale configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct I18nConfig {
    /// Locale originals are authored in
    #[serde(default = "default_locale")]
    pub default_locale: String,

    /// Locales content may be translated into
    #[serde(default)]
    pub locales: Vec<String>,
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            default_locale: default_locale(),
            locales: Vec::new(),
        }
    }
}

impl I18nConfig {
    /// Whether content may be translated into `locale`.
    ///
    /// An empty `locales` list accepts any locale other than the default.
    pub fn accepts_translation_locale(&self, locale: &str) -> bool {
        if locale == self.default_locale {
            return false;
        }
        self.locales.is_empty() || self.locales.iter().any(|known| known == locale)
    }
}

impl LocaleProvider for I18nConfig {
    fn default_locale(&self) -> String {
        self.default_locale.clone()
    }
}

/// What the front page shows
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FrontPageMode {
    /// Latest posts listing
    #[default]
    Posts,
    /// A static page
    Page,
}

/// Front page configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct SiteConfig {
    /// Front page mode
    #[serde(default)]
    pub show_on_front: FrontPageMode,

    /// Object used as the front page in `page` mode
    #[serde(default)]
    pub page_on_front: Option<i64>,
}

impl SiteSettings for SiteConfig {
    fn home_object_id(&self) -> Option<i64> {
        if !self.is_home_paging_enabled() {
            return None;
        }
        self.page_on_front.filter(|id| *id > 0)
    }

    fn is_home_paging_enabled(&self) -> bool {
        self.show_on_front == FrontPageMode::Page
    }
}

/// Query cache configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CacheConfig {
    /// Whether identical queries are served from memory
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Matching `log` filter
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_table_prefix() -> String {
    "wp_".to_string()
}

fn default_locale() -> String {
    "en_US".to_string()
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load a JSON configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to open config file: {:?}", path))?;

        Self::from_json(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Parse configuration from a JSON string
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if !is_locale_code(&self.i18n.default_locale) {
            return Err(anyhow!(
                "Invalid default locale: '{}'",
                self.i18n.default_locale
            ));
        }

        if let Some(bad) = self.i18n.locales.iter().find(|l| !is_locale_code(l)) {
            return Err(anyhow!("Invalid locale: '{}'", bad));
        }

        let prefix_ok = self
            .database
            .table_prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !prefix_ok {
            return Err(anyhow!(
                "Table prefix may only contain letters, digits and '_': '{}'",
                self.database.table_prefix
            ));
        }

        if self.site.show_on_front == FrontPageMode::Page
            && !self.site.page_on_front.is_some_and(|id| id > 0)
        {
            return Err(anyhow!("A front page id is required when show_on_front is 'page'"));
        }

        Ok(())
    }
}

/// `ll`, `ll_CC` or `ll-CC` style codes whose language part is a known
/// ISO 639-1 or ISO 639-3 code
fn is_locale_code(code: &str) -> bool {
    let mut parts = code.splitn(2, ['_', '-']);
    let language = parts.next().unwrap_or_default();
    if !language.chars().all(|c| c.is_ascii_lowercase()) {
        return false;
    }

    let known_language = match language.len() {
        2 => Language::from_639_1(language).is_some(),
        3 => Language::from_639_3(language).is_some(),
        _ => false,
    };

    match parts.next() {
        None => known_language,
        Some(region) => {
            known_language
                && (2..=3).contains(&region.len())
                && (region.chars().all(|c| c.is_ascii_uppercase())
                    || region.chars().all(|c| c.is_ascii_digit()))
        }
    }
}
