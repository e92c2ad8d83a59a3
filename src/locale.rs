// src/locale.rs
//! Locale store: active display language and its translation catalog

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

use crate::app_log;
use crate::core::SharedStorage;

pub const LANGUAGE_KEY: &str = "language";

const EN_CATALOG: &str = include_str!("../locales/en.toml");
const ZH_CATALOG: &str = include_str!("../locales/zh.toml");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Zh,
    En,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::Zh, Language::En];

    pub fn code(&self) -> &'static str {
        match self {
            Language::Zh => "zh",
            Language::En => "en",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Language::Zh => "中文",
            Language::En => "English",
        }
    }

    pub fn flag(&self) -> &'static str {
        match self {
            Language::Zh => "🇨🇳",
            Language::En => "🇺🇸",
        }
    }

    /// Exact match against the supported codes.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|lang| lang.code() == code)
    }

    fn catalog_source(&self) -> &'static str {
        match self {
            Language::Zh => ZH_CATALOG,
            Language::En => EN_CATALOG,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Flat key -> string table for one language.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: HashMap<String, String>,
}

impl Catalog {
    pub fn parse(source: &str) -> Result<Self> {
        let entries: HashMap<String, String> =
            toml::from_str(source).context("Failed to parse translation catalog")?;
        Ok(Self { entries })
    }

    /// The catalog shipped with the crate; an unparseable one is logged and empty.
    pub fn builtin(language: Language) -> Self {
        match Self::parse(language.catalog_source()) {
            Ok(catalog) => catalog,
            Err(e) => {
                app_log!(error, "Catalog for {} is unusable: {:#}", language, e);
                Self::default()
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

pub struct LocaleStore {
    storage: SharedStorage,
    language: Language,
    catalogs: HashMap<Language, Catalog>,
}

impl LocaleStore {
    /// Restore the language from storage, defaulting when it is absent,
    /// unsupported, or unreadable.
    pub fn initialize(storage: SharedStorage) -> Self {
        let language = match storage.get(LANGUAGE_KEY) {
            Ok(Some(code)) => Language::from_code(&code).unwrap_or_else(|| {
                app_log!(warn, "Stored language '{}' is not supported", code);
                Language::default()
            }),
            Ok(None) => Language::default(),
            Err(e) => {
                app_log!(warn, "Could not read stored language: {}", e);
                Language::default()
            }
        };

        let catalogs = Language::ALL
            .into_iter()
            .map(|lang| (lang, Catalog::builtin(lang)))
            .collect();

        let store = Self {
            storage,
            language,
            catalogs,
        };
        store.persist();
        app_log!(info, "Locale initialized: {}", language);
        store
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Switch to `code` if it is supported; anything else is ignored.
    pub fn change_language(&mut self, code: &str) -> bool {
        match Language::from_code(code) {
            Some(language) => {
                self.language = language;
                self.persist();
                app_log!(info, "Language changed to {}", language);
                true
            }
            None => {
                app_log!(debug, "Ignoring unsupported language code '{}'", code);
                false
            }
        }
    }

    /// Look `key` up in the active catalog; a missing key comes back as itself.
    pub fn translate<'a>(&'a self, key: &'a str) -> &'a str {
        self.catalogs
            .get(&self.language)
            .and_then(|catalog| catalog.get(key))
            .unwrap_or(key)
    }

    pub fn supported_languages(&self) -> &'static [Language] {
        &Language::ALL
    }

    fn persist(&self) {
        if let Err(e) = self.storage.set(LANGUAGE_KEY, self.language.code()) {
            app_log!(warn, "Could not persist language: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{MemoryStorage, UnavailableStorage};
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_defaults_to_chinese() {
        let store = LocaleStore::initialize(MemoryStorage::shared());
        assert_eq!(store.language(), Language::Zh);
        assert_eq!(store.translate("login"), "登录");
    }

    #[test]
    fn test_restores_persisted_language() {
        let storage = MemoryStorage::shared();
        storage.set(LANGUAGE_KEY, "en").unwrap();

        let store = LocaleStore::initialize(storage);
        assert_eq!(store.language(), Language::En);
        assert_eq!(store.translate("login"), "Login");
    }

    #[test]
    fn test_invalid_persisted_language_falls_back() {
        let storage = MemoryStorage::shared();
        storage.set(LANGUAGE_KEY, "fr").unwrap();

        let store = LocaleStore::initialize(storage.clone());
        assert_eq!(store.language(), Language::Zh);
        assert_eq!(storage.get(LANGUAGE_KEY).unwrap().as_deref(), Some("zh"));
    }

    #[test]
    fn test_change_language_persists() {
        let storage = MemoryStorage::shared();
        let mut store = LocaleStore::initialize(storage.clone());

        assert!(store.change_language("en"));
        assert_eq!(store.language(), Language::En);
        assert_eq!(storage.get(LANGUAGE_KEY).unwrap().as_deref(), Some("en"));

        let reloaded = LocaleStore::initialize(storage);
        assert_eq!(reloaded.language(), Language::En);
    }

    #[test]
    fn test_unsupported_code_is_a_no_op() {
        let storage = MemoryStorage::shared();
        let mut store = LocaleStore::initialize(storage.clone());
        store.change_language("en");

        assert!(!store.change_language("de"));
        assert!(!store.change_language("EN"));
        assert!(!store.change_language(""));
        assert_eq!(store.language(), Language::En);
        assert_eq!(storage.get(LANGUAGE_KEY).unwrap().as_deref(), Some("en"));
    }

    #[test]
    fn test_missing_key_returns_key() {
        let store = LocaleStore::initialize(MemoryStorage::shared());
        assert_eq!(store.translate("no_such_key"), "no_such_key");
    }

    #[test]
    fn test_builtin_catalogs_share_keys() {
        let en = Catalog::builtin(Language::En);
        let zh = Catalog::builtin(Language::Zh);
        assert!(!en.is_empty());

        let en_keys: HashSet<&str> = en.keys().collect();
        let zh_keys: HashSet<&str> = zh.keys().collect();
        assert_eq!(en_keys, zh_keys);
    }

    #[test]
    fn test_catalog_parse_error() {
        assert!(Catalog::parse("key = ").is_err());
        assert!(Catalog::parse("[nested]\nkey = \"v\"").is_err());
    }

    #[test]
    fn test_unavailable_storage_still_switches() {
        let mut store = LocaleStore::initialize(Arc::new(UnavailableStorage));
        assert_eq!(store.language(), Language::Zh);
        assert!(store.change_language("en"));
        assert_eq!(store.translate("welcome"), "Welcome Back");
    }
}
