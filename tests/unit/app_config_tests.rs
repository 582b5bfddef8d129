/*!
 * Tests for application configuration functionality
 */

use polyglot::app_config::{Config, FrontPageMode, LogLevel};
use polyglot::providers::{LocaleProvider, SiteSettings};

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.database.table_prefix, "wp_");
    assert!(config.database.path.is_none());
    assert_eq!(config.i18n.default_locale(), "en_US");
    assert_eq!(config.site.show_on_front, FrontPageMode::Posts);
    assert!(config.cache.enabled);
    assert_eq!(config.log_level, LogLevel::Info);
    assert!(config.validate().is_ok());
}

#[test]
fn test_fromJson_withPartialDocument_shouldFillDefaults() {
    let config = Config::from_json(
        r#"{
            "i18n": { "default_locale": "fr_FR" },
            "site": { "show_on_front": "page", "page_on_front": 42 },
            "log_level": "debug"
        }"#,
    )
    .unwrap();

    assert_eq!(config.i18n.default_locale(), "fr_FR");
    assert_eq!(config.database.table_prefix, "wp_");
    assert!(config.site.is_home_paging_enabled());
    assert_eq!(config.site.home_object_id(), Some(42));
    assert_eq!(config.log_level, LogLevel::Debug);
    assert_eq!(config.log_level.to_level_filter(), log::LevelFilter::Debug);
}

/// Test configuration validation
#[test]
fn test_config_validation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = Config::default();
    assert!(config.validate().is_ok());

    config.i18n.default_locale = "".to_string();
    assert!(config.validate().is_err());
    config.i18n.default_locale = "en_US".to_string();

    config.i18n.locales = vec!["fr_FR".to_string(), "not a locale".to_string()];
    assert!(config.validate().is_err());
    config.i18n.locales.clear();

    config.database.table_prefix = "wp_; DROP TABLE x".to_string();
    assert!(config.validate().is_err());
    config.database.table_prefix = "site2_".to_string();
    assert!(config.validate().is_ok());

    config.site.show_on_front = FrontPageMode::Page;
    assert!(config.validate().is_err());
    config.site.page_on_front = Some(-1);
    assert!(config.validate().is_err());
    config.site.page_on_front = Some(7);
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_validation_withNonIsoLanguage_shouldFail() {
    let mut config = Config::default();

    config.i18n.default_locale = "zz_ZZ".to_string();
    assert!(config.validate().is_err());
    config.i18n.default_locale = "en_US".to_string();

    config.i18n.locales = vec!["qq".to_string()];
    assert!(config.validate().is_err());

    config.i18n.locales = vec!["fr_FR".to_string(), "pt-BR".to_string()];
    assert!(config.validate().is_ok());
}

#[test]
fn test_load_withMissingFile_shouldFailWithContext() {
    let result = Config::load("/nonexistent/polyglot.json");

    let message = format!("{:#}", result.unwrap_err());
    assert!(message.contains("Failed to open config file"));
}

#[test]
fn test_load_withFile_shouldParseJson() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("polyglot.json");
    std::fs::write(&path, r#"{ "cache": { "enabled": false } }"#).unwrap();

    let config = Config::load(&path).unwrap();

    assert!(!config.cache.enabled);
}
