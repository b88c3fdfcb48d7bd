use super::*;
use std::io::Write;
use tempfile::{tempdir, NamedTempFile};

#[test]
fn test_default_config_getters() {
    let config = ResolverConfig::default();
    assert_eq!(config.get_cache_capacity(), DEFAULT_CACHE_CAPACITY);
    assert_eq!(config.get_max_ascent_depth(), DEFAULT_MAX_ASCENT_DEPTH);
    assert_eq!(config.get_locale_separator(), Some(DEFAULT_LOCALE_SEPARATOR));
    assert_eq!(config.get_platform_separator(), None);
    assert_eq!(config.get_platform(), std::env::consts::OS);
}

#[test]
fn test_zero_capacity_is_coerced() {
    let config = ResolverConfig {
        cache_capacity: Some(0),
        ..Default::default()
    };
    assert_eq!(config.get_cache_capacity(), 1);
}

#[test]
fn test_empty_separator_disables_splitting() {
    let config = ResolverConfig {
        locale_separator: Some(String::new()),
        platform_separator: Some(String::new()),
        ..Default::default()
    };
    assert_eq!(config.get_locale_separator(), None);
    assert_eq!(config.get_platform_separator(), None);
}

#[test]
fn test_explicit_locale_wins_over_environment() {
    let config = ResolverConfig {
        locale: Some("de_CH".to_string()),
        platform: Some("gtk".to_string()),
        ..Default::default()
    };
    assert_eq!(config.get_locale(), "de_CH");
    assert_eq!(config.get_platform(), "gtk");
}

#[test]
fn test_locale_from_lang() {
    assert_eq!(locale_from_lang("en_US.UTF-8"), "en_US");
    assert_eq!(locale_from_lang("sr_RS@latin"), "sr_RS");
    assert_eq!(locale_from_lang("fr"), "fr");
    assert_eq!(locale_from_lang("C"), "");
    assert_eq!(locale_from_lang("POSIX"), "");
}

#[test]
fn test_camel_case_json() {
    let json = r#"{"cacheCapacity": 4, "maxAscentDepth": 8, "locale": "en_GB"}"#;
    let config: ResolverConfig = serde_json::from_str(json).unwrap();
    assert_eq!(config.cache_capacity, Some(4));
    assert_eq!(config.max_ascent_depth, Some(8));
    assert_eq!(config.locale.as_deref(), Some("en_GB"));
    assert_eq!(config.platform, None);
}

#[test]
fn test_serialization_skips_unset_fields() {
    let config = ResolverConfig {
        cache_capacity: Some(16),
        ..Default::default()
    };
    let json = serde_json::to_string(&config).unwrap();
    assert_eq!(json, r#"{"cacheCapacity":16}"#);
}

#[test]
fn test_load_missing_file_returns_defaults() {
    let dir = tempdir().unwrap();
    let config = load_config(&dir.path().join("missing.json"));
    assert_eq!(config, ResolverConfig::default());
}

#[test]
fn test_load_valid_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, r#"{{"platformSeparator": "-", "platform": "linux-gtk"}}"#).unwrap();

    let config = load_config(file.path());
    assert_eq!(config.get_platform_separator(), Some("-"));
    assert_eq!(config.get_platform(), "linux-gtk");
}

#[test]
fn test_invalid_json_falls_back_to_defaults() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{{ not json").unwrap();

    assert!(try_load_config(file.path()).is_err());
    assert_eq!(load_config(file.path()), ResolverConfig::default());
}

#[test]
fn test_default_config_path() {
    assert!(default_config_path().ends_with(".kit/keybindings.json"));
}
