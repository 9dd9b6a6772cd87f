//! Internationalization (i18n) support
//!
//! The active language is never looked up globally: handlers resolve a
//! [`Language`] once per request and pass it down explicitly.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::Result;

/// Built-in UI strings, overridable from `locales/{lang}/common.json`
const BUILTIN_EN: &str = include_str!("../../locales/en/common.json");
const BUILTIN_ES: &str = include_str!("../../locales/es/common.json");

/// Languages the site is published in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    #[default]
    En,
    Es,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::En, Language::Es];

    /// Two-letter code used in resource paths
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Es => "es",
        }
    }

    /// Exact match on a supported code ("en", "ES", "es-VE" all accepted)
    pub fn from_code(code: &str) -> Option<Self> {
        let primary = code.trim().get(..2)?.to_ascii_lowercase();
        Self::ALL.into_iter().find(|lang| lang.code() == primary)
    }

    /// Resolve a locale string, falling back to English when unsupported
    pub fn resolve(locale: &str) -> Self {
        Self::from_code(locale).unwrap_or_default()
    }

    /// First supported language in an `Accept-Language` header
    pub fn from_accept_language(header: &str) -> Option<Self> {
        let mut ranked: Vec<(f32, &str)> = header
            .split(',')
            .filter_map(|part| {
                let mut pieces = part.split(';');
                let tag = pieces.next()?.trim();
                let q = pieces
                    .find_map(|p| p.trim().strip_prefix("q="))
                    .and_then(|q| q.parse::<f32>().ok())
                    .unwrap_or(1.0);
                Some((q, tag))
            })
            .collect();
        // stable sort keeps header order among equal weights
        ranked.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        ranked
            .into_iter()
            .filter(|(q, _)| *q > 0.0)
            .find_map(|(_, tag)| Self::from_code(tag))
    }

    /// Pick the language for a request: explicit parameter, then the
    /// `Accept-Language` header, then the site default.
    pub fn negotiate(param: Option<&str>, accept: Option<&str>, default: Language) -> Self {
        param
            .and_then(Self::from_code)
            .or_else(|| accept.and_then(Self::from_accept_language))
            .unwrap_or(default)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Translation tables: lang -> key -> value
pub struct I18n {
    translations: HashMap<String, HashMap<String, serde_json::Value>>,
}

impl I18n {
    /// Create an empty handler
    pub fn new() -> Self {
        Self {
            translations: HashMap::new(),
        }
    }

    /// Handler preloaded with the built-in English and Spanish strings
    pub fn builtin() -> Result<Self> {
        let mut i18n = Self::new();
        i18n.insert_json(Language::En.code(), BUILTIN_EN)?;
        i18n.insert_json(Language::Es.code(), BUILTIN_ES)?;
        Ok(i18n)
    }

    /// Load `{dir}/{lang}/common.json` for every language directory present.
    /// Files on disk replace the built-in table for that language.
    pub fn load_languages<P: AsRef<Path>>(&mut self, dir: P) -> Result<()> {
        let dir = dir.as_ref();
        if !dir.exists() {
            return Ok(());
        }

        for entry in fs::read_dir(dir)? {
            let path = entry?.path().join("common.json");
            if !path.is_file() {
                continue;
            }

            let lang = path
                .parent()
                .and_then(|p| p.file_name())
                .and_then(|s| s.to_str())
                .unwrap_or("en")
                .to_string();

            let content = fs::read_to_string(&path)?;
            // skip invalid files, keep whatever was loaded before
            match self.insert_json(&lang, &content) {
                Ok(()) => tracing::debug!("Loaded language file: {:?}", path),
                Err(e) => tracing::warn!("Failed to parse language file {:?}: {}", path, e),
            }
        }

        Ok(())
    }

    fn insert_json(&mut self, lang: &str, content: &str) -> Result<()> {
        let data: HashMap<String, serde_json::Value> = serde_json::from_str(content)?;
        self.translations.insert(lang.to_string(), data);
        Ok(())
    }

    /// Get a translation for a specific language.
    /// Key can be nested like "blog.back_to_magazine".
    pub fn get(&self, lang: Language, key: &str) -> String {
        if let Some(lang_data) = self.translations.get(lang.code()) {
            if let Some(value) = get_nested_value(lang_data, key) {
                return json_value_to_string(value);
            }
        }

        // Fallback to English
        if lang != Language::En {
            if let Some(lang_data) = self.translations.get(Language::En.code()) {
                if let Some(value) = get_nested_value(lang_data, key) {
                    return json_value_to_string(value);
                }
            }
        }

        // Return key as fallback
        key.to_string()
    }

    /// Get a pluralized translation, replacing `%d` with the count
    pub fn get_plural(&self, lang: Language, key: &str, count: usize) -> String {
        let plural_key = if count == 0 {
            format!("{}.zero", key)
        } else if count == 1 {
            format!("{}.one", key)
        } else {
            format!("{}.other", key)
        };

        self.get(lang, &plural_key).replace("%d", &count.to_string())
    }

    /// All translations for `lang` flattened to dot-notation keys,
    /// with English filling any gaps
    pub fn get_all_translations(&self, lang: Language) -> HashMap<String, String> {
        let mut result = HashMap::new();

        if let Some(lang_data) = self.translations.get(lang.code()) {
            flatten_translations(lang_data, "", &mut result);
        }

        if lang != Language::En {
            if let Some(en_data) = self.translations.get(Language::En.code()) {
                let mut en_result = HashMap::new();
                flatten_translations(en_data, "", &mut en_result);
                for (k, v) in en_result {
                    result.entry(k).or_insert(v);
                }
            }
        }

        result
    }
}

/// Get a nested value from a JSON map using dot notation
fn get_nested_value<'a>(
    data: &'a HashMap<String, serde_json::Value>,
    key: &str,
) -> Option<&'a serde_json::Value> {
    let mut parts = key.split('.');
    let mut current = data.get(parts.next()?);

    for part in parts {
        current = current?.as_object()?.get(part);
    }

    current
}

fn json_value_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Flatten translations into a HashMap with dot-notation keys
fn flatten_translations(
    data: &HashMap<String, serde_json::Value>,
    prefix: &str,
    result: &mut HashMap<String, String>,
) {
    for (key, value) in data {
        let full_key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };

        match value {
            serde_json::Value::Object(map) => {
                let nested: HashMap<String, serde_json::Value> =
                    map.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
                flatten_translations(&nested, &full_key, result);
            }
            serde_json::Value::Array(_) => {}
            other => {
                result.insert(full_key, json_value_to_string(other));
            }
        }
    }
}

impl Default for I18n {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_resolution() {
        assert_eq!(Language::resolve("es-VE"), Language::Es);
        assert_eq!(Language::resolve("EN"), Language::En);
        assert_eq!(Language::resolve("fr"), Language::En);
        assert_eq!(Language::resolve(""), Language::En);
        assert_eq!(Language::from_code("de"), None);
    }

    #[test]
    fn test_accept_language() {
        assert_eq!(
            Language::from_accept_language("fr-FR,fr;q=0.9,es;q=0.8,en;q=0.7"),
            Some(Language::Es)
        );
        assert_eq!(
            Language::from_accept_language("en;q=0.5, es-VE"),
            Some(Language::Es)
        );
        assert_eq!(Language::from_accept_language("de, fr"), None);
    }

    #[test]
    fn test_negotiate_order() {
        assert_eq!(
            Language::negotiate(Some("en"), Some("es"), Language::Es),
            Language::En
        );
        assert_eq!(
            Language::negotiate(Some("xx"), Some("es"), Language::En),
            Language::Es
        );
        assert_eq!(Language::negotiate(None, None, Language::Es), Language::Es);
    }

    #[test]
    fn test_get_translation() {
        let mut i18n = I18n::new();
        i18n.insert_json("en", r#"{"hello": "Hello", "blog": {"back": "Back"}}"#)
            .unwrap();
        i18n.insert_json("es", r#"{"hello": "Hola"}"#).unwrap();

        assert_eq!(i18n.get(Language::Es, "hello"), "Hola");
        assert_eq!(i18n.get(Language::Es, "blog.back"), "Back");
        assert_eq!(i18n.get(Language::En, "unknown"), "unknown");
    }

    #[test]
    fn test_get_plural() {
        let mut i18n = I18n::new();
        i18n.insert_json(
            "en",
            r#"{"homes": {"zero": "No homes", "one": "1 home", "other": "%d homes"}}"#,
        )
        .unwrap();
        assert_eq!(i18n.get_plural(Language::En, "homes", 0), "No homes");
        assert_eq!(i18n.get_plural(Language::En, "homes", 1), "1 home");
        assert_eq!(i18n.get_plural(Language::En, "homes", 7), "7 homes");
    }

    #[test]
    fn test_builtin_tables_cover_both_languages() {
        let i18n = I18n::builtin().unwrap();
        let en = i18n.get_all_translations(Language::En);
        let es = i18n.get_all_translations(Language::Es);
        assert!(en.contains_key("blog.back_to_magazine"));
        for key in en.keys() {
            assert!(es.contains_key(key), "missing Spanish fallback for {}", key);
        }
        assert_ne!(
            i18n.get(Language::Es, "blog.back_to_magazine"),
            i18n.get(Language::En, "blog.back_to_magazine")
        );
    }

    #[test]
    fn test_load_languages_overrides_builtin() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("es")).unwrap();
        fs::write(
            dir.path().join("es/common.json"),
            r#"{"nav": {"buy": "Comprar ya"}}"#,
        )
        .unwrap();
        fs::create_dir_all(dir.path().join("en")).unwrap();
        fs::write(dir.path().join("en/common.json"), "not json").unwrap();

        let mut i18n = I18n::builtin().unwrap();
        i18n.load_languages(dir.path()).unwrap();
        assert_eq!(i18n.get(Language::Es, "nav.buy"), "Comprar ya");
        // the broken English file is skipped, built-ins survive
        assert_eq!(i18n.get(Language::En, "nav.buy"), "Buy");
    }
}
