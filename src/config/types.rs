//! Configuration type definitions

use serde::{Deserialize, Serialize};

use super::defaults::*;

/// Settings for a [`BindingManager`](crate::bindings::BindingManager).
///
/// Every field is optional in the JSON file; getters fall back to the
/// defaults in `defaults.rs` or to the host environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolverConfig {
    /// Number of resolved world states kept before least-recently-used eviction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_capacity: Option<usize>,
    /// Cycle guard for scheme and context ascent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_ascent_depth: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale_separator: Option<String>,
    /// Platform strings are not split unless a separator is configured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_separator: Option<String>,
    /// Initial locale (default: derived from $LANG)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    /// Initial platform (default: the compile-time target OS)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
}

impl ResolverConfig {
    /// Cache capacity, never zero.
    pub fn get_cache_capacity(&self) -> usize {
        self.cache_capacity.unwrap_or(DEFAULT_CACHE_CAPACITY).max(1)
    }

    pub fn get_max_ascent_depth(&self) -> usize {
        self.max_ascent_depth.unwrap_or(DEFAULT_MAX_ASCENT_DEPTH).max(1)
    }

    pub fn get_locale_separator(&self) -> Option<&str> {
        match self.locale_separator.as_deref() {
            Some("") => None,
            Some(sep) => Some(sep),
            None => Some(DEFAULT_LOCALE_SEPARATOR),
        }
    }

    pub fn get_platform_separator(&self) -> Option<&str> {
        self.platform_separator.as_deref().filter(|sep| !sep.is_empty())
    }

    pub fn get_locale(&self) -> String {
        self.locale
            .clone()
            .or_else(|| std::env::var("LANG").ok().map(|lang| locale_from_lang(&lang)))
            .unwrap_or_else(|| FALLBACK_LOCALE.to_string())
    }

    pub fn get_platform(&self) -> String {
        self.platform
            .clone()
            .unwrap_or_else(|| std::env::consts::OS.to_string())
    }
}

/// Strip encoding and modifier suffixes from a POSIX locale ("en_US.UTF-8@euro" -> "en_US").
pub fn locale_from_lang(lang: &str) -> String {
    let end = lang.find(['.', '@']).unwrap_or(lang.len());
    let locale = lang[..end].trim();
    if locale == "C" || locale == "POSIX" {
        String::new()
    } else {
        locale.to_string()
    }
}
